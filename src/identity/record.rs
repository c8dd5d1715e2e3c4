//! Identity records and their claim-file encoding.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// System tag written for scheduler jobs.
pub const SLURM_TAG: &str = "SLURM";

/// The identity domain an owner id belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum System {
    /// A cluster scheduler job; the owner id is the job id.
    Cluster,
    /// A local process; the tag names the platform it ran on (e.g. `linux`).
    Local(String),
}

impl System {
    /// The local system tag for this platform.
    pub fn local() -> Self {
        System::Local(std::env::consts::OS.to_string())
    }

    /// The tag written into claim files.
    pub fn tag(&self) -> &str {
        match self {
            System::Cluster => SLURM_TAG,
            System::Local(platform) => platform,
        }
    }

    fn from_tag(tag: &str) -> Self {
        if tag == SLURM_TAG {
            System::Cluster
        } else {
            System::Local(tag.to_string())
        }
    }
}

/// Who holds a claim.
///
/// For [`System::Cluster`] the node id is always 0 and the owner id is the
/// scheduler job id. For [`System::Local`] the node id identifies the machine
/// and the owner id is the process id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityRecord {
    pub system: System,
    pub node_id: u64,
    pub owner_id: u64,
}

impl IdentityRecord {
    /// Identity of a scheduler job.
    pub fn cluster(job_id: u64) -> Self {
        Self {
            system: System::Cluster,
            node_id: 0,
            owner_id: job_id,
        }
    }

    /// Identity of a process on this platform.
    pub fn local(node_id: u64, pid: u64) -> Self {
        Self {
            system: System::local(),
            node_id,
            owner_id: pid,
        }
    }

    /// The single line written into a claim file.
    pub fn to_claim_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for IdentityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.system.tag(), self.node_id, self.owner_id)
    }
}

/// Claim content that does not encode an identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unparsable lock owner {content:?}")]
pub struct ParseIdentityError {
    pub content: String,
}

impl FromStr for IdentityRecord {
    type Err = ParseIdentityError;

    /// Parse claim content.
    ///
    /// Accepts `<tag> <node-id> <owner-id>` and the legacy bare job id, which
    /// is read as a scheduler job.
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdentityError {
            content: content.to_string(),
        };
        let fields: Vec<&str> = content.split_whitespace().collect();

        match fields.as_slice() {
            [tag, node_id, owner_id] => Ok(Self {
                system: System::from_tag(tag),
                node_id: node_id.parse().map_err(|_| err())?,
                owner_id: owner_id.parse().map_err(|_| err())?,
            }),
            [job_id] => Ok(Self::cluster(job_id.parse().map_err(|_| err())?)),
            _ => Err(err()),
        }
    }
}
