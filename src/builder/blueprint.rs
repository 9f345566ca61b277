//! Builder for constructing blueprints.

use crate::builder::error::BuildError;
use crate::controller::ControllerPolicy;
use crate::lineage::{Blueprint, CapabilityProvider, Member, Operation, OperationSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Builder for blueprints with a fluent API.
///
/// # Example
///
/// ```
/// use stateflow::builder::BlueprintBuilder;
/// use stateflow::core::Primitive;
/// use stateflow::lineage::Member;
/// use std::time::Duration;
///
/// let blueprint = BlueprintBuilder::new("sensor")
///     .member("unit", Member::Attribute(Primitive::from("celsius")))
///     .controller_timeout(Duration::from_millis(50))
///     .build()
///     .unwrap();
///
/// assert!(blueprint.non_meta_state());
/// assert!(blueprint.operations().contains("unit"));
/// ```
pub struct BlueprintBuilder {
    name: String,
    members: Vec<(String, Member)>,
    provider: Option<Arc<dyn CapabilityProvider>>,
    policy: ControllerPolicy,
}

impl BlueprintBuilder {
    /// Create a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            provider: None,
            policy: ControllerPolicy::default(),
        }
    }

    /// Add a blueprint member (optional).
    ///
    /// Blueprint members take precedence over provider members of the same name.
    pub fn member(mut self, name: impl Into<String>, member: Member) -> Self {
        self.members.push((name.into(), member));
        self
    }

    /// Inject a base capability provider (optional).
    pub fn provider(mut self, provider: Arc<dyn CapabilityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Bound every controller call of forked containers (optional).
    pub fn controller_timeout(mut self, timeout: Duration) -> Self {
        self.policy = ControllerPolicy::with_timeout(timeout);
        self
    }

    /// Build the blueprint.
    /// Returns an error if the name or a member is invalid.
    pub fn build(self) -> Result<Blueprint, BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::EmptyName);
        }

        let mut own = OperationSet::core();
        for (name, member) in self.members {
            validate_member(&name, &member)?;
            own.insert(name, member);
        }

        let provider = self.provider.filter(|p| p.is_available());
        let non_meta_state = provider.is_none();

        let operations = match provider {
            Some(provider) => {
                let mut base = OperationSet::new();
                for (name, member) in provider.members() {
                    if name.is_empty() {
                        warn!(blueprint = %self.name, "Skipping unnamed provider member");
                        continue;
                    }
                    base.insert(name, member);
                }
                base.overlay(own);
                base
            }
            None => own,
        };

        debug!(
            blueprint = %self.name,
            members = operations.len(),
            non_meta_state,
            "Built blueprint"
        );

        Ok(Blueprint::from_parts(
            self.name,
            operations,
            non_meta_state,
            self.policy,
        ))
    }
}

fn validate_member(name: &str, member: &Member) -> Result<(), BuildError> {
    if name.is_empty() {
        return Err(BuildError::EmptyMemberName);
    }
    match Operation::from_name(name) {
        Some(op) if *member != Member::Operation(op) => Err(BuildError::ReservedMember {
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Primitive;

    struct MetaProvider {
        available: bool,
    }

    impl CapabilityProvider for MetaProvider {
        fn is_available(&self) -> bool {
            self.available
        }

        fn members(&self) -> Vec<(String, Member)> {
            vec![
                ("kind".to_string(), Member::Attribute(Primitive::from("meta"))),
                ("visible".to_string(), Member::Attribute(Primitive::from(true))),
                ("set".to_string(), Member::Attribute(Primitive::Null)),
                (String::new(), Member::Attribute(Primitive::Null)),
            ]
        }
    }

    #[test]
    fn builder_validates_name() {
        let result = BlueprintBuilder::new("").build();
        assert!(matches!(result, Err(BuildError::EmptyName)));
    }

    #[test]
    fn builder_validates_member_names() {
        let result = BlueprintBuilder::new("entity")
            .member("", Member::Attribute(Primitive::Null))
            .build();
        assert!(matches!(result, Err(BuildError::EmptyMemberName)));
    }

    #[test]
    fn builder_protects_core_operations() {
        let result = BlueprintBuilder::new("entity")
            .member("merge", Member::Attribute(Primitive::from(false)))
            .build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::ReservedMember {
                name: "merge".to_string()
            }
        );

        let same = BlueprintBuilder::new("entity")
            .member("merge", Member::Operation(Operation::Merge))
            .build();
        assert!(same.is_ok());
    }

    #[test]
    fn missing_provider_marks_non_meta_state() {
        let blueprint = BlueprintBuilder::new("entity").build().unwrap();

        assert!(blueprint.non_meta_state());
        assert_eq!(*blueprint.operations().as_ref(), OperationSet::core());
    }

    #[test]
    fn unavailable_provider_is_treated_as_absent() {
        let blueprint = BlueprintBuilder::new("entity")
            .provider(Arc::new(MetaProvider { available: false }))
            .build()
            .unwrap();

        assert!(blueprint.non_meta_state());
        assert!(!blueprint.operations().contains("kind"));
    }

    #[test]
    fn provider_members_are_inherited_with_blueprint_precedence() {
        let blueprint = BlueprintBuilder::new("entity")
            .provider(Arc::new(MetaProvider { available: true }))
            .member("kind", Member::Attribute(Primitive::from("door")))
            .build()
            .unwrap();

        let operations = blueprint.operations();
        assert!(!blueprint.non_meta_state());
        assert_eq!(
            operations.get("kind"),
            Some(&Member::Attribute(Primitive::from("door")))
        );
        assert_eq!(
            operations.get("visible"),
            Some(&Member::Attribute(Primitive::from(true)))
        );
        assert!(operations.supports(Operation::Set));
        assert!(!operations.contains(""));
    }

    #[test]
    fn controller_timeout_sets_policy() {
        let blueprint = BlueprintBuilder::new("entity")
            .controller_timeout(Duration::from_millis(5))
            .build()
            .unwrap();

        assert_eq!(blueprint.policy().timeout, Some(Duration::from_millis(5)));
    }
}
