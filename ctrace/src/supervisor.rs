use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::Result;

/// Owns the worker tasks and the token that stops them.
pub struct Supervisor {
	shutdown: CancellationToken,
	tasks: JoinSet<Result<()>>,
}

impl Supervisor {
	pub fn new() -> Self {
		Self {
			shutdown: CancellationToken::new(),
			tasks: JoinSet::new(),
		}
	}

	pub fn token(&self) -> CancellationToken {
		self.shutdown.clone()
	}

	/// Spawns a worker. A worker that fails cancels the token, so the others
	/// and whoever waits on it stop too.
	pub fn spawn<F>(&mut self, fut: F)
	where
		F: Future<Output = Result<()>> + Send + 'static,
	{
		let shutdown = self.shutdown.clone();
		self.tasks.spawn(async move {
			let res = fut.await;
			if let Err(err) = &res {
				error!("worker failed: {err}");
				shutdown.cancel();
			}
			res
		});
	}

	/// Cancels every worker and waits for all of them, returning the first error.
	pub async fn shutdown(mut self) -> Result<()> {
		info!("Supervisor shutdown starting");
		self.shutdown.cancel();

		let mut first_err = None;
		while let Some(res) = self.tasks.join_next().await {
			let res = match res {
				Ok(res) => res,
				Err(join_err) => Err(join_err.into()),
			};
			if let Err(err) = res {
				first_err.get_or_insert(err);
			}
		}
		info!("Supervisor shutdown complete");

		match first_err {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}

// region:    --- Tests


// endregion: --- Tests
