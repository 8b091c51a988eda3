//! Registration of the vecfunc functions with a DataFusion session

use datafusion::logical_expr::{AggregateUDF, ScalarUDF};
use datafusion::prelude::SessionContext;

use crate::aggregate::DistanceAggregate;
use crate::config::ExtensionConfig;
use crate::greeting::GreetingUdf;
use crate::list::ListDistanceUdf;
use crate::Result;

/// Bundle of every function this crate contributes
#[derive(Debug, Clone, Default)]
pub struct VectorExtension {
    config: ExtensionConfig,
}

impl VectorExtension {
    /// Extension name
    pub const NAME: &'static str = "vector";

    /// Create an extension with a validated configuration
    pub fn new(config: ExtensionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    /// Scalar functions enabled by the configuration
    pub fn scalar_functions(&self) -> Vec<ScalarUDF> {
        let mut functions: Vec<ScalarUDF> = Vec::new();
        if self.config.greeting {
            functions.push(GreetingUdf::new().into());
        }
        if self.config.list_functions {
            functions.extend(
                ListDistanceUdf::all(self.config.parallel_threshold)
                    .into_iter()
                    .map(ScalarUDF::from),
            );
        }
        functions
    }

    /// Aggregate functions enabled by the configuration
    pub fn aggregate_functions(&self) -> Vec<AggregateUDF> {
        if !self.config.aggregates {
            return Vec::new();
        }
        DistanceAggregate::all()
            .into_iter()
            .map(AggregateUDF::from)
            .collect()
    }

    /// Register every enabled function; later SQL on `ctx` can call them
    pub fn register(&self, ctx: &SessionContext) {
        let scalars = self.scalar_functions();
        let aggregates = self.aggregate_functions();
        let (scalar_count, aggregate_count) = (scalars.len(), aggregates.len());

        for udf in scalars {
            tracing::debug!(function = udf.name(), aliases = ?udf.aliases(), "registering scalar function");
            ctx.register_udf(udf);
        }
        for udaf in aggregates {
            tracing::debug!(function = udaf.name(), aliases = ?udaf.aliases(), "registering aggregate function");
            ctx.register_udaf(udaf);
        }

        tracing::info!(
            extension = Self::NAME,
            scalar_functions = scalar_count,
            aggregate_functions = aggregate_count,
            "extension loaded"
        );
    }

    /// Fresh session with this extension loaded
    pub fn session_context(&self) -> SessionContext {
        let ctx = SessionContext::new();
        self.register(&ctx);
        ctx
    }
}

/// Fresh session with every function loaded
pub fn session_context() -> SessionContext {
    VectorExtension::default().session_context()
}
