// SPDX-License-Identifier: GPL-3.0-only
mod backend;
mod enumeration;
mod manager;

pub use backend::{Control, Level, Monitor};
pub use manager::DisplayDirectory;
