//! Access policy rendering
//!
//! Maps a (resource kind, access level) grant onto the provider actions it
//! allows.

use crate::resource::ResourceType;
use serde::Serialize;
use std::fmt;

/// Access granted to a compute unit on another resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    Read,
    Write,
    ReadWrite,
}

impl AccessLevel {
    pub fn includes_read(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn includes_write(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "read-write",
        })
    }
}

const BUCKET_READ: &[&str] = &["s3:GetObject*", "s3:GetBucket*", "s3:List*"];
const BUCKET_WRITE: &[&str] = &["s3:DeleteObject*", "s3:PutObject*", "s3:Abort*"];

const TABLE_READ: &[&str] = &[
    "dynamodb:BatchGetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:GetItem",
    "dynamodb:Scan",
    "dynamodb:ConditionCheckItem",
    "dynamodb:DescribeTable",
];
const TABLE_WRITE: &[&str] = &[
    "dynamodb:BatchWriteItem",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
    "dynamodb:DescribeTable",
];

/// Actions allowed by `level` on a resource of `kind`.
///
/// Returns `None` for kinds that cannot be granted on.
pub fn actions(kind: ResourceType, level: AccessLevel) -> Option<Vec<&'static str>> {
    let (read, write) = match kind {
        ResourceType::Bucket => (BUCKET_READ, BUCKET_WRITE),
        ResourceType::Table => (TABLE_READ, TABLE_WRITE),
        ResourceType::Layer | ResourceType::Lambda | ResourceType::Api => return None,
    };

    let mut allowed: Vec<&'static str> = Vec::new();
    if level.includes_read() {
        allowed.extend_from_slice(read);
    }
    if level.includes_write() {
        for action in write {
            if !allowed.contains(action) {
                allowed.push(*action);
            }
        }
    }
    Some(allowed)
}
