//! Random statement generation
//!
//! Produces statement sets shaped like real tenant policies: every statement
//! grants endpoint actions within one service and tenant, mixes concrete KRNs
//! with a tenant-wide wildcard, and every `wildcard_every`-th statement also
//! covers the whole service.

use crate::config::GeneratorConfig;
use crate::error::StoreResult;
use crate::identifier::{Action, Krn, KrnParts};
use crate::store::{Effect, Statement};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

const ACTIONS: &[&str] = &["iam:endpoint:read", "iam:endpoint:write", "iam:endpoint:delete"];
const TOKEN_LEN: usize = 10;

/// Seedable generator of valid statements
pub struct StatementGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl StatementGenerator {
    /// Create a generator; a configured seed makes the output reproducible
    pub fn new(config: &GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config: config.clone(),
            rng,
        }
    }

    /// Generate `services * statements_per_service` statements, numbered from 1
    pub fn generate(&mut self) -> StoreResult<Vec<Statement>> {
        let total = self.config.services * self.config.statements_per_service;
        let mut statements = Vec::with_capacity(total);

        for _ in 0..self.config.services {
            let service = self.token();

            for j in 0..self.config.statements_per_service {
                let tenant = self.token();
                let service_wide =
                    self.config.wildcard_every > 0 && j % self.config.wildcard_every == 0;

                let mut statement = self.statement(&service, &tenant, service_wide)?;
                statement.id = statements.len() as u64 + 1;
                statements.push(statement);
            }

            debug!(
                service = %service,
                generated = statements.len(),
                total,
                "Generated service statements"
            );
        }

        Ok(statements)
    }

    fn statement(
        &mut self,
        service: &str,
        tenant: &str,
        service_wide: bool,
    ) -> StoreResult<Statement> {
        let actions = ACTIONS
            .iter()
            .map(|a| Action::parse(a))
            .collect::<Result<Vec<_>, _>>()?;
        let resources = self.identifiers(
            self.config.resources_per_statement,
            service,
            tenant,
            "endpoint",
            service_wide,
        )?;
        let principals = self.identifiers(
            self.config.principals_per_statement,
            service,
            tenant,
            "user",
            service_wide,
        )?;
        let effect = if self.rng.random_bool(0.5) {
            Effect::Allow
        } else {
            Effect::Deny
        };

        Statement::new(effect, actions, resources, principals)
    }

    /// The first identifier may cover the service, the second covers the
    /// tenant, the rest are concrete resources with random UUIDs
    fn identifiers(
        &mut self,
        count: usize,
        service: &str,
        tenant: &str,
        resource_type: &str,
        service_wide: bool,
    ) -> StoreResult<Vec<Krn>> {
        let mut krns = Vec::with_capacity(count);
        for i in 0..count {
            let krn = match i {
                0 if service_wide => Krn::new(KrnParts::new(service, "*"))?,
                1 => Krn::new(KrnParts::new(service, tenant).with_resource("*", ""))?,
                _ => Krn::new(
                    KrnParts::new(service, tenant).with_resource(resource_type, self.uuid()),
                )?,
            };
            krns.push(krn);
        }
        Ok(krns)
    }

    fn token(&mut self) -> String {
        (0..TOKEN_LEN)
            .map(|_| char::from(self.rng.random_range(b'a'..=b'z')))
            .collect()
    }

    fn uuid(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes);
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string()
    }
}
