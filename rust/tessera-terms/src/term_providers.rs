//! Parallel construction of one [`TermProvider`] per requested field.

use tessera_common::{Result, error::Error};
use tessera_shard::ShardRef;
use tessera_workflow::TaskExecutor;

use crate::term_provider::TermProvider;

/// Options for [`TermProviders::build`].
#[derive(Debug, Clone, Default)]
pub struct TermProvidersOptions {
    max_parallelism: Option<usize>,
}

impl TermProvidersOptions {
    pub fn new() -> TermProvidersOptions {
        Default::default()
    }

    /// Caps the number of field builds submitted to the executor at once.
    /// Without a cap (the default) the degree is left to the executor.
    pub fn max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = Some(max_parallelism.max(1));
        self
    }

    pub fn parallelism_limit(&self) -> Option<usize> {
        self.max_parallelism
    }
}

/// Term providers keyed by field name, in the caller's requested order.
#[derive(Debug, Default)]
pub struct TermProviders {
    providers: Vec<TermProvider>,
}

impl TermProviders {
    /// Builds a provider for each of `fields` over `shards`.
    ///
    /// Each field is an independent task submitted to `executor`. Results are
    /// collected in the order of `fields`, whatever the completion order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a field is requested twice. If building any
    /// field fails, the whole build fails with `Build { field, source }` for
    /// the first failing field in request order and no providers are returned.
    pub fn build<S: AsRef<str>>(
        shards: &[ShardRef],
        fields: &[S],
        options: &TermProvidersOptions,
        executor: &impl TaskExecutor,
    ) -> Result<TermProviders> {
        let fields = fields.iter().map(AsRef::as_ref).collect::<Vec<&str>>();
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].contains(field) {
                return Err(Error::invalid_arg(
                    "fields",
                    format!("field '{field}' requested more than once"),
                ));
            }
        }

        let batch_size = options
            .max_parallelism
            .unwrap_or(usize::MAX)
            .min(fields.len())
            .max(1);
        log::debug!(
            "building {} term providers over {} shards (batch {batch_size}, degree {})",
            fields.len(),
            shards.len(),
            executor.max_degree()
        );

        let mut providers = Vec::with_capacity(fields.len());
        for batch in fields.chunks(batch_size) {
            let built = executor.try_map(batch.to_vec(), |field| {
                log::trace!("building term provider for '{field}'");
                let provider =
                    TermProvider::build(field, shards).map_err(|e| Error::build(field, e))?;
                log::trace!(
                    "term provider for '{field}' has {} sources",
                    provider.source_count()
                );
                Ok::<_, Error>(provider)
            })?;
            providers.extend(built);
        }
        Ok(TermProviders { providers })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&TermProvider> {
        self.providers.iter().find(|p| p.field() == field)
    }

    /// Removes and returns the provider of `field`, e.g. to consume its
    /// merged term stream.
    pub fn take(&mut self, field: &str) -> Option<TermProvider> {
        let index = self.providers.iter().position(|p| p.field() == field)?;
        Some(self.providers.remove(index))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(TermProvider::field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermProvider)> {
        self.providers.iter().map(|p| (p.field(), p))
    }
}

impl IntoIterator for TermProviders {
    type Item = (String, TermProvider);
    type IntoIter = std::vec::IntoIter<(String, TermProvider)>;

    fn into_iter(self) -> Self::IntoIter {
        self.providers
            .into_iter()
            .map(|p| (p.field().to_string(), p))
            .collect::<Vec<_>>()
            .into_iter()
    }
}
