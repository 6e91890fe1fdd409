use std::sync::Arc;

use item_core::{Record, RecordSchema, Value};
use item_logging::{item_debug, item_trace};

use crate::{DocumentViews, ExtractError, Instruction, QueryDispatcher, RuleSet};

/// Builds records of one type from fetched documents.
///
/// Every instruction for a field acts as a cross-check on the others: the
/// first instruction that matches sets the value, and any later match must
/// agree with it or the whole pass fails with [`ExtractError::Conflict`].
/// Instructions that match nothing are skipped.
///
/// An extractor is immutable and may be shared across threads; each call to
/// [`ItemExtractor::extract`] produces an independent record.
#[derive(Debug)]
pub struct ItemExtractor {
    schema: Arc<RecordSchema>,
    rules: RuleSet,
    dispatcher: QueryDispatcher,
}

impl ItemExtractor {
    pub fn new(schema: Arc<RecordSchema>, rules: RuleSet) -> Self {
        Self::with_dispatcher(schema, rules, QueryDispatcher::default())
    }

    pub fn with_dispatcher(
        schema: Arc<RecordSchema>,
        rules: RuleSet,
        dispatcher: QueryDispatcher,
    ) -> Self {
        Self {
            schema,
            rules,
            dispatcher,
        }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Runs every instruction against `views` and returns the unvalidated
    /// record. Fields whose instructions all miss are left unset.
    pub fn extract(&self, views: &dyn DocumentViews) -> Result<Record, ExtractError> {
        item_debug!(
            "extracting {} with rules for {} field(s)",
            self.schema.name(),
            self.rules.len()
        );
        let mut record = Record::new(Arc::clone(&self.schema));
        for (field, instructions) in self.rules.iter() {
            match self.resolve(field, instructions, views)? {
                Some(value) => {
                    record.set(field, value)?;
                }
                None => item_debug!("{}.{}: no instruction matched", self.schema.name(), field),
            }
        }
        Ok(record)
    }

    /// [`extract`](Self::extract) followed by [`Record::validate`].
    pub fn extract_validated(&self, views: &dyn DocumentViews) -> Result<Record, ExtractError> {
        let mut record = self.extract(views)?;
        record.validate()?;
        Ok(record)
    }

    fn resolve(
        &self,
        field: &str,
        instructions: &[Instruction],
        views: &dyn DocumentViews,
    ) -> Result<Option<Value>, ExtractError> {
        let mut resolved: Option<Value> = None;
        for instruction in instructions {
            let Some(value) = self.dispatcher.evaluate_instruction(instruction, views)? else {
                item_trace!("{field}: {instruction} matched nothing");
                continue;
            };
            match &resolved {
                None => {
                    item_trace!("{field}: {instruction} -> {value}");
                    resolved = Some(value);
                }
                Some(first) if *first == value => {}
                Some(first) => {
                    return Err(ExtractError::Conflict {
                        field: field.to_string(),
                        first: first.clone(),
                        second: value,
                    });
                }
            }
        }
        Ok(resolved)
    }
}
