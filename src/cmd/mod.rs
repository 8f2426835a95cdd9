//! CLI command implementations.
//!
//! | Module     | Commands handled                                    |
//! |------------|-----------------------------------------------------|
//! | `info`     | `Info`, the default with no command, `--debug` dump |
//! | `init`     | `Init`                                              |
//! | `browsers` | `Browsers`                                          |
//! | `theme`    | `Build`, `Watch`, `Fetch`, `Upload` and the rest    |

pub mod browsers;
pub mod info;
pub mod init;
pub mod theme;

pub use browsers::cmd_browsers;
pub use info::{cmd_debug, cmd_info};
pub use init::cmd_init;
pub use theme::cmd_theme;
