//! # kinbase Client
//!
//! Network side of kinbase: an HTTP [`Transport`], file uploads, and the
//! [`Database`] facade that ties them to the engine's codec.
//!
//! ```no_run
//! use kinbase_client::{Auth, Config, Database, HttpTransport};
//! use kinbase_engine::Record;
//!
//! # async fn run() -> kinbase_client::Result<()> {
//! let config = Config::new("https://example.cybozu.com", Auth::ApiToken("token".into()));
//! let db = Database::new(HttpTransport::new(config)?);
//!
//! let mut record = Record::new();
//! record.set_text("title", "hello");
//! let id = db.insert(1, &mut record).await?;
//!
//! let mut rs = db.select(1, &format!("$id = {}", id), &[]).await?;
//! while rs.next() {
//!     println!("{:?}", rs.get_string("title")?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod transport;
pub mod upload;

pub use config::{Auth, Config, ConfigError};
pub use database::Database;
pub use error::{Error, Result};
pub use transport::{HttpTransport, Method, Request, Transport};
pub use upload::{has_pending_uploads, resolve_batch, resolve_record, Uploader};
