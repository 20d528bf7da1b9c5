use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::storage::LedgerSnapshot;

use super::{AppError, Command, Confirmation, LedgerService};

const QUEUE_DEPTH: usize = 64;

enum Request {
    Execute {
        command: Command,
        reply: oneshot::Sender<Result<Confirmation, AppError>>,
    },
    Snapshot {
        reply: oneshot::Sender<LedgerSnapshot>,
    },
}

/// Cloneable handle to a ledger running on its own task.
///
/// The task owns the [`LedgerService`] and applies requests one at a time in
/// arrival order, so composite commands never interleave.
#[derive(Clone)]
pub struct LedgerHandle {
    tx: mpsc::Sender<Request>,
}

impl LedgerHandle {
    /// Move `service` onto a new task and return a handle to it.
    /// Must be called from within a tokio runtime.
    pub fn spawn(service: LedgerService) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(run(service, rx));
        Self { tx }
    }

    pub async fn execute(&self, command: Command) -> Result<Confirmation, AppError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Request::Execute { command, reply })
            .await
            .map_err(|_| AppError::ServiceUnavailable)?;
        response.await.map_err(|_| AppError::ServiceUnavailable)?
    }

    pub async fn snapshot(&self) -> Result<LedgerSnapshot, AppError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Request::Snapshot { reply })
            .await
            .map_err(|_| AppError::ServiceUnavailable)?;
        response.await.map_err(|_| AppError::ServiceUnavailable)
    }
}

async fn run(mut service: LedgerService, mut rx: mpsc::Receiver<Request>) {
    while let Some(request) = rx.recv().await {
        match request {
            Request::Execute { command, reply } => {
                let result = service.execute(command);
                // The caller may have given up waiting
                let _ = reply.send(result);
            }
            Request::Snapshot { reply } => {
                let _ = reply.send(service.snapshot());
            }
        }
    }
    debug!("all ledger handles dropped, stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::household_repository;

    #[tokio::test]
    async fn test_handle_applies_commands_in_order() {
        let handle = LedgerHandle::spawn(LedgerService::new(household_repository().unwrap()));

        let first = handle
            .execute(Command::Deduct {
                user_id: 0,
                amount: 300,
            })
            .await
            .unwrap();
        assert_eq!(first.message, "Deducted 3 for Sean");

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.users[0].rupee_amount, 1000);
    }

    #[tokio::test]
    async fn test_handle_returns_command_errors() {
        let handle = LedgerHandle::spawn(LedgerService::new(household_repository().unwrap()));

        let err = handle
            .execute(Command::DeleteDebt { id: 99 })
            .await
            .unwrap_err();
        assert_eq!(err, AppError::DebtNotFound(99));
    }

    #[tokio::test]
    async fn test_concurrent_clients_are_serialized() {
        let handle = LedgerHandle::spawn(LedgerService::new(household_repository().unwrap()));

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle
                    .execute(Command::Pay {
                        user_id_list: vec![0, 1],
                        amount: 100,
                    })
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.users[0].rupee_amount, 1300 + 2000);
        assert_eq!(snapshot.users[1].rupee_amount, -800 + 2000);
    }
}
