//! Discover whether the current process may open the raw sockets that
//! `hopstat` needs, and acquire or drop that capability.
//!
//! - On Linux the `CAP_NET_RAW` capability is checked, raised if it is
//!   permitted but not effective, and cleared once sockets are open.
//! - On other Unix platforms the process must run with an effective user
//!   id of root.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use hopstat_privilege::Privilege;
//!
//! let privilege = Privilege::acquire_privileges()?;
//! if !privilege.has_privileges() {
//!     eprintln!("raw sockets are not available");
//! }
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

/// A privilege error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A privilege error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[cfg(target_os = "linux")]
    #[error("caps error: {0}")]
    CapsError(#[from] caps::errors::CapsError),
}

/// The raw socket privileges held by the current process.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Privilege {
    has_privileges: bool,
}

impl Privilege {
    /// Inspect the privileges of the current process without changing them.
    pub fn discover() -> Result<Self> {
        Ok(Self {
            has_privileges: Self::check_has_privileges()?,
        })
    }

    #[must_use]
    pub const fn new(has_privileges: bool) -> Self {
        Self { has_privileges }
    }

    /// Whether raw sockets may be opened.
    #[must_use]
    pub const fn has_privileges(&self) -> bool {
        self.has_privileges
    }

    #[cfg(target_os = "linux")]
    pub fn acquire_privileges() -> Result<Self> {
        if caps::has_cap(None, caps::CapSet::Permitted, caps::Capability::CAP_NET_RAW)? {
            caps::raise(None, caps::CapSet::Effective, caps::Capability::CAP_NET_RAW)?;
        }
        Self::discover()
    }

    #[cfg(target_os = "linux")]
    fn check_has_privileges() -> Result<bool> {
        Ok(caps::has_cap(
            None,
            caps::CapSet::Effective,
            caps::Capability::CAP_NET_RAW,
        )?)
    }

    /// Clear every effective capability.
    ///
    /// Sockets which are already open keep working.
    #[cfg(target_os = "linux")]
    pub fn drop_privileges() -> Result<()> {
        caps::clear(None, caps::CapSet::Effective)?;
        Ok(())
    }

    #[cfg(all(unix, not(target_os = "linux")))]
    pub fn acquire_privileges() -> Result<Self> {
        Self::discover()
    }

    #[cfg(all(unix, not(target_os = "linux")))]
    #[allow(clippy::unnecessary_wraps)]
    fn check_has_privileges() -> Result<bool> {
        Ok(nix::unistd::Uid::effective().is_root())
    }

    #[cfg(all(unix, not(target_os = "linux")))]
    #[allow(clippy::unnecessary_wraps)]
    pub const fn drop_privileges() -> Result<()> {
        Ok(())
    }
}
