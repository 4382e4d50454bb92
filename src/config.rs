use serde::{Deserialize, Serialize};

use std::fs;
use std::path::Path;

use crate::buffer::manager::Error;

// unpin 時の dirty フラグの扱い
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirtyPolicy {
    // 最後に unpin した者の指定で上書きする
    Overwrite,
    // 一度 dirty になったら flush されるまで dirty のまま
    Accumulate,
}

impl Default for DirtyPolicy {
    fn default() -> Self {
        DirtyPolicy::Overwrite
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferPoolConfig {
    pub pool_size: usize,
    pub dirty_policy: DirtyPolicy,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            dirty_policy: DirtyPolicy::default(),
        }
    }
}

impl BufferPoolConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.pool_size == 0 {
            return Err(Error::InvalidPoolSize);
        }
        Ok(())
    }
}
