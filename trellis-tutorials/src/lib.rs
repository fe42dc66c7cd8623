//! Tutorial applications built on Trellis.
//!
//! Each app under [`apps`] is a root module that can be served by the
//! `trellis-tutorials` binary or driven in-process through
//! `trellis_testing::TestClient`. [`users`] holds the shared in-memory user
//! store and [`pipes`] the custom transform pipes.
//!
//! ```
//! use trellis_tutorials::users::{Store, User, UserStore};
//!
//! let store = UserStore::new();
//! store.add_user(User::new(1, "John").with_email("john@example.com"));
//! assert_eq!(store.find_user(1).unwrap().name, "John");
//! assert!(store.delete_user(2).is_err());
//! ```

pub mod apps;
pub mod config;
pub mod pipes;
pub mod users;

pub use config::{AppConfig, TutorialApp};
pub use pipes::{CapitalizePipe, RangePipe};
pub use users::{Store, StoreError, StoreMessage, UpdateUserDto, User, UserStore};
