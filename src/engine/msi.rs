//! Windows Installer Engine
//!
//! [`PackageEngine`] backed by the `msi` crate. Packages are not `Send`, so
//! every package lives on a single worker thread that owns them all; callers
//! talk to it over a command channel.

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use ::msi::{Select, Value};
use tokio::sync::oneshot;

use super::{ColumnInfo, EngineError, HandleId, PackageEngine, PackageHandle, Row, TableInfo};

type Package = ::msi::Package<Cursor<Vec<u8>>>;
type Reply<T> = oneshot::Sender<Result<T, EngineError>>;

enum Command {
    Open { data: Vec<u8>, reply: Reply<HandleId> },
    Free(HandleId),
    Tables { id: HandleId, reply: Reply<Vec<TableInfo>> },
    Rows { id: HandleId, table: String, reply: Reply<Vec<Row>> },
}

/// Engine for Windows Installer packages (`.msi`, `.msm`, `.msp`).
#[derive(Debug)]
pub struct MsiEngine {
    commands: mpsc::Sender<Command>,
    live: Arc<AtomicUsize>,
}

impl MsiEngine {
    /// Start the worker thread. It exits once the engine is dropped.
    pub fn spawn() -> io::Result<Self> {
        let (commands, receiver) = mpsc::channel();
        let live = Arc::new(AtomicUsize::new(0));

        // Packages are built and dropped on the worker thread only.
        let counter = Arc::clone(&live);
        thread::Builder::new()
            .name("msi-engine".to_string())
            .spawn(move || {
                let worker = Worker {
                    packages: HashMap::new(),
                    next_id: 1,
                    live: counter,
                };
                worker.run(receiver)
            })?;

        Ok(Self { commands, live })
    }

    /// Number of packages currently allocated by the worker.
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)?
    }
}

#[tower_lsp::async_trait]
impl PackageEngine for MsiEngine {
    async fn open(&self, data: Vec<u8>) -> Result<PackageHandle, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Open { data, reply })
            .map_err(|_| EngineError::Stopped)?;

        let pending = PendingOpen {
            response,
            commands: self.commands.clone(),
            settled: false,
        };
        let id = pending.wait().await?;
        Ok(PackageHandle::new(id))
    }

    fn free(&self, handle: PackageHandle) {
        if self.commands.send(Command::Free(handle.id())).is_err() {
            log::warn!("Package engine stopped before freeing {}", handle.id());
        }
    }

    async fn tables(&self, id: HandleId) -> Result<Vec<TableInfo>, EngineError> {
        self.request(|reply| Command::Tables { id, reply }).await
    }

    async fn rows(&self, id: HandleId, table: &str) -> Result<Vec<Row>, EngineError> {
        let table = table.to_string();
        self.request(|reply| Command::Rows { id, table, reply })
            .await
    }
}

/// An open whose reply has not been taken yet. Dropping it before then
/// hands back any package the worker already allocated for it.
struct PendingOpen {
    response: oneshot::Receiver<Result<HandleId, EngineError>>,
    commands: mpsc::Sender<Command>,
    settled: bool,
}

impl PendingOpen {
    async fn wait(mut self) -> Result<HandleId, EngineError> {
        let result = (&mut self.response)
            .await
            .map_err(|_| EngineError::Stopped)?;
        self.settled = true;
        result
    }
}

impl Drop for PendingOpen {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        // After `close` the worker can no longer deliver, so a reply is
        // either already here or the worker frees the package itself.
        self.response.close();
        if let Ok(Ok(id)) = self.response.try_recv() {
            log::debug!("Open of package {} was cancelled after reply", id);
            if self.commands.send(Command::Free(id)).is_err() {
                log::warn!("Package engine stopped before freeing {}", id);
            }
        }
    }
}

struct Worker {
    packages: HashMap<HandleId, Package>,
    next_id: u64,
    live: Arc<AtomicUsize>,
}

impl Worker {
    fn run(mut self, receiver: mpsc::Receiver<Command>) {
        while let Ok(command) = receiver.recv() {
            match command {
                Command::Open { data, reply } => self.open(data, reply),
                Command::Free(id) => self.free(id),
                Command::Tables { id, reply } => {
                    let _ = reply.send(self.tables(id));
                }
                Command::Rows { id, table, reply } => {
                    let _ = reply.send(self.rows(id, &table));
                }
            }
        }

        if !self.packages.is_empty() {
            log::warn!(
                "Package engine stopping with {} packages still open",
                self.packages.len()
            );
        }
    }

    fn open(&mut self, data: Vec<u8>, reply: Reply<HandleId>) {
        log::debug!("Opening package from {} bytes", data.len());
        let package = match Package::open(Cursor::new(data)) {
            Ok(package) => package,
            Err(e) => {
                let _ = reply.send(Err(EngineError::Malformed(e.to_string())));
                return;
            }
        };

        let id = HandleId(self.next_id);
        self.next_id += 1;
        self.packages.insert(id, package);
        self.live.fetch_add(1, Ordering::SeqCst);

        // The caller stopped waiting, so nobody will ever own this handle.
        if reply.send(Ok(id)).is_err() {
            log::debug!("Open of package {} was cancelled", id);
            self.free(id);
        }
    }

    fn free(&mut self, id: HandleId) {
        if self.packages.remove(&id).is_some() {
            self.live.fetch_sub(1, Ordering::SeqCst);
            log::debug!("Freed package {}", id);
        } else {
            log::warn!("Free called for unknown package {}", id);
        }
    }

    fn tables(&self, id: HandleId) -> Result<Vec<TableInfo>, EngineError> {
        let package = self
            .packages
            .get(&id)
            .ok_or(EngineError::UnknownHandle(id))?;

        Ok(package.tables().map(table_info).collect())
    }

    fn rows(&mut self, id: HandleId, table: &str) -> Result<Vec<Row>, EngineError> {
        let package = self
            .packages
            .get_mut(&id)
            .ok_or(EngineError::UnknownHandle(id))?;
        if !package.has_table(table) {
            return Err(EngineError::TableNotFound(table.to_string()));
        }

        log::debug!("Enumerating '{}' table", table);
        let rows = package
            .select_rows(Select::table(table))
            .map_err(|e| EngineError::Read {
                table: table.to_string(),
                reason: e.to_string(),
            })?;

        Ok(rows
            .map(|row| {
                let mut values = Row::with_capacity(row.len());
                for (i, column) in row.columns().iter().enumerate() {
                    values.insert(column.name().to_string(), cell_text(&row[i]));
                }
                values
            })
            .collect())
    }
}

fn table_info(table: &::msi::Table) -> TableInfo {
    TableInfo {
        name: table.name().to_string(),
        columns: table
            .columns()
            .iter()
            .map(|column| ColumnInfo {
                name: column.name().to_string(),
                column_type: column.coltype().to_string(),
                category: column.category().map(|c| c.to_string()),
                primary_key: column.is_primary_key(),
                nullable: column.is_nullable(),
                localizable: column.is_localizable(),
            })
            .collect(),
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Int(number) => Some(number.to_string()),
        Value::Str(text) => Some(text.clone()),
    }
}
