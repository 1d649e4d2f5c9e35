use crate::answer::DEFAULT_TTL;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    #[serde(default = "default_answer_ttl")]
    pub answer_ttl: u32,

    /// Attempts at the conditional rotation write-back before the last
    /// computed answer is served without persisting its step.
    #[serde(default = "default_rotation_max_retries")]
    pub rotation_max_retries: u32,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            answer_ttl: default_answer_ttl(),
            rotation_max_retries: default_rotation_max_retries(),
        }
    }
}

fn default_answer_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_rotation_max_retries() -> u32 {
    3
}
