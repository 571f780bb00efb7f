use super::{ConfigError, ConfigResult, DispatchPolicy};

/// Builder for DispatchPolicy that wraps the policy itself
#[derive(Debug, Clone, Default)]
pub struct DispatchPolicyBuilder {
    policy: DispatchPolicy,
}

impl DispatchPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_policy(policy: DispatchPolicy) -> Self {
        Self { policy }
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.policy.connect_timeout_ms = ms;
        self
    }

    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.policy.read_timeout_ms = ms;
        self
    }

    pub fn grpc_read_timeout_ms(mut self, ms: u64) -> Self {
        self.policy.grpc_read_timeout_ms = ms;
        self
    }

    pub fn grpc_max_message_size(mut self, bytes: usize) -> Self {
        self.policy.grpc_max_message_size = bytes;
        self
    }

    pub fn build(self) -> ConfigResult<DispatchPolicy> {
        let policy = self.policy;
        let checks = [
            ("connect_timeout_ms", policy.connect_timeout_ms as u128),
            ("read_timeout_ms", policy.read_timeout_ms as u128),
            ("grpc_read_timeout_ms", policy.grpc_read_timeout_ms as u128),
            ("grpc_max_message_size", policy.grpc_max_message_size as u128),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Must be greater than zero".to_string(),
                });
            }
        }
        Ok(policy)
    }

    pub fn build_unchecked(self) -> DispatchPolicy {
        self.policy
    }
}

impl DispatchPolicy {
    pub fn builder() -> DispatchPolicyBuilder {
        DispatchPolicyBuilder::new()
    }

    pub fn to_builder(&self) -> DispatchPolicyBuilder {
        DispatchPolicyBuilder::from_policy(*self)
    }
}
