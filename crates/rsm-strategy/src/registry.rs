//! Policy registry
//!
//! Provides [`PolicyRegistry`] for selecting scenario policies by name, as
//! read from configuration files or the command line.

use crate::importance::ImportanceScenarios;
use crate::nominal::NominalScenario;
use crate::policy::ScenarioPolicy;
use crate::random::RandomScenarios;
use crate::worst_case::WorstCaseScenarios;
use rsm_core::ScenarioError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

type PolicyFactory = Arc<dyn Fn() -> ScenarioPolicy + Send + Sync>;

/// Registry mapping policy names to factories
///
/// Aliases resolve to a registered name. Each [`create`](Self::create) call
/// builds a fresh policy, so a random policy created twice gets two seeds.
/// Names registered by [`with_defaults`](Self::with_defaults) stay built-in
/// until [`register`](Self::register) replaces them.
#[derive(Clone, Default)]
pub struct PolicyRegistry {
    factories: BTreeMap<String, PolicyFactory>,
    aliases: BTreeMap<String, String>,
    builtin: BTreeSet<String>,
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("names", &self.names())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl PolicyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with built-in policies
    ///
    /// Registers `nominal`, `worst_case`, `random` and `importance`, each with
    /// its short alias (`nomScen`, `wcScen`, `rndScen`, `impScen`).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("nominal", || NominalScenario::new().into());
        registry.register("worst_case", || WorstCaseScenarios::new().into());
        registry.register("random", || RandomScenarios::new().into());
        registry.register("importance", || ImportanceScenarios::new().into());
        registry.alias("nomScen", "nominal");
        registry.alias("wcScen", "worst_case");
        registry.alias("rndScen", "random");
        registry.alias("impScen", "importance");
        registry.builtin = registry.factories.keys().cloned().collect();
        registry
    }

    /// Register a policy factory, replacing any previous one of that name
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> ScenarioPolicy + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
        self.builtin.remove(name);
    }

    /// Register an alternative name for a registered policy
    pub fn alias(&mut self, alias: &str, target: &str) {
        self.aliases.insert(alias.to_string(), target.to_string());
    }

    /// Resolve a name or alias to the registered name
    #[must_use]
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        let target = self.aliases.get(name).map_or(name, String::as_str);
        self.factories.get_key_value(target).map(|(k, _)| k.as_str())
    }

    /// Check if a name or alias resolves to a policy
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Check if a name or alias resolves to an unreplaced built-in policy
    #[must_use]
    pub fn is_builtin(&self, name: &str) -> bool {
        self.resolve(name)
            .is_some_and(|target| self.builtin.contains(target))
    }

    /// Build a fresh policy by name or alias
    ///
    /// # Errors
    /// `UnknownPolicy` if nothing is registered under `name`
    pub fn create(&self, name: &str) -> Result<ScenarioPolicy, ScenarioError> {
        let target = self.aliases.get(name).map_or(name, String::as_str);
        self.factories
            .get(target)
            .map(|factory| factory())
            .ok_or_else(|| ScenarioError::UnknownPolicy(name.to_string()))
    }

    /// Remove policy and every alias pointing to it
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.factories.remove(name).is_some();
        if removed {
            self.builtin.remove(name);
            self.aliases.retain(|_, target| target != name);
        }
        removed
    }

    /// List registered policy names in sorted order (aliases excluded)
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Get number of registered policies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
