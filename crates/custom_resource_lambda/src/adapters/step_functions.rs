use async_trait::async_trait;
use custom_resource_core::capability::{CapabilityError, StateMachineCreated, WorkflowDefinitions};
use custom_resource_core::operation::StateMachineSpec;

use super::service_error;

pub struct SfnWorkflowDefinitions {
    client: aws_sdk_sfn::Client,
}

impl SfnWorkflowDefinitions {
    pub fn new(client: aws_sdk_sfn::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkflowDefinitions for SfnWorkflowDefinitions {
    async fn create(
        &self,
        spec: &StateMachineSpec,
    ) -> Result<StateMachineCreated, CapabilityError> {
        let output = self
            .client
            .create_state_machine()
            .name(&spec.name)
            .definition(spec.definition_json())
            .role_arn(&spec.role_arn)
            .send()
            .await
            .map_err(|error| service_error("failed to create state machine", error))?;

        Ok(StateMachineCreated {
            arn: output.state_machine_arn().to_string(),
        })
    }

    async fn delete(&self, arn: &str) -> Result<(), CapabilityError> {
        self.client
            .delete_state_machine()
            .state_machine_arn(arn)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| service_error("failed to delete state machine", error))
    }
}
