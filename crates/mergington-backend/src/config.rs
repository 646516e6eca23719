use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::services::EnrollmentPolicy;

/// Command line and environment configuration for the backend.
#[derive(Debug, Clone, Parser)]
#[command(name = "mergington-backend", about = "Mergington High School activities API")]
pub struct Config {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "MERGINGTON_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    #[arg(long, env = "MERGINGTON_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory served under `/static`.
    #[arg(long, env = "MERGINGTON_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// JSON file replacing the built-in activity catalog.
    #[arg(long, env = "MERGINGTON_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Reject signups once an activity reaches `max_participants`.
    #[arg(long, env = "MERGINGTON_ENFORCE_CAPACITY")]
    pub enforce_capacity: bool,

    /// Allow each student to hold a place in at most one activity.
    #[arg(long, env = "MERGINGTON_EXCLUSIVE_ENROLLMENT")]
    pub exclusive_enrollment: bool,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn policy(&self) -> EnrollmentPolicy {
        EnrollmentPolicy {
            enforce_capacity: self.enforce_capacity,
            exclusive: self.exclusive_enrollment,
        }
    }
}
