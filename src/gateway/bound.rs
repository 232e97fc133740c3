use crate::error::EntityError;
use crate::gateway::{RelationalGateway, Row};
use crate::hydrator::RowHydrator;
use crate::sql::{QueryBuf, Statement};

/// A statement tied to the gateway (and adapter) that created it.
///
/// ```ignore
/// let rows = gateway
///     .select(&["id", "email"])
///     .map(|s| s.where_eq("active", 1).order_by("id", true).limit(10))
///     .fetch()?;
/// gateway.insert(values).map(|s| s.ignore(true)).exec()?;
/// ```
pub struct Bound<'g, S> {
    gateway: &'g RelationalGateway,
    statement: S,
}

impl<'g, S: Statement> Bound<'g, S> {
    pub(crate) fn new(gateway: &'g RelationalGateway, statement: S) -> Self {
        Bound { gateway, statement }
    }

    /// Refine the statement (conditions, limits, flags).
    pub fn map(self, f: impl FnOnce(S) -> S) -> Self {
        Bound {
            gateway: self.gateway,
            statement: f(self.statement),
        }
    }

    pub fn statement(&self) -> &S {
        &self.statement
    }

    pub fn into_inner(self) -> S {
        self.statement
    }

    pub fn build(&self) -> QueryBuf {
        self.statement.build()
    }

    pub fn exec(&self) -> Result<bool, EntityError> {
        self.gateway.execute(&self.build())
    }

    pub fn fetch(&self) -> Result<Vec<Row>, EntityError> {
        self.gateway.fetch(&self.build())
    }

    pub fn hydrate(&self) -> Result<RowHydrator, EntityError> {
        Ok(RowHydrator::new(self.fetch()?))
    }
}
