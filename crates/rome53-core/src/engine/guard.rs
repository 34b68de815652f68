//! Record guard
//!
//! The only record shape rome53 will rewrite is a plain A record holding a
//! single value. Anything else is refused before the provider is asked to
//! change anything.

use crate::domain::DomainName;
use crate::error::{Error, Result};
use crate::traits::{RecordSet, RecordType};

/// Select the single-valued A record named `domain`
///
/// # Errors
///
/// - `Error::NotARecord`: the name holds no A record, or an alias A record
///   without values of its own (alone or next to a plain one)
/// - `Error::MultipleValues`: the A record (or several A record sets of
///   the same name) hold more than one value
pub fn single_a_record<'a>(
    records: &'a [RecordSet],
    domain: &DomainName,
) -> Result<&'a RecordSet> {
    let a_records: Vec<&RecordSet> = records
        .iter()
        .filter(|r| {
            r.record_type == RecordType::A && r.name.eq_ignore_ascii_case(domain.as_str())
        })
        .collect();

    if a_records.is_empty() || a_records.iter().any(|r| r.values.is_empty()) {
        return Err(Error::NotARecord(domain.to_string()));
    }

    let values: Vec<String> = a_records
        .iter()
        .flat_map(|r| r.values.iter().cloned())
        .collect();

    match (a_records.as_slice(), values.len()) {
        ([record], 1) => Ok(*record),
        _ => Err(Error::MultipleValues {
            domain: domain.to_string(),
            values,
        }),
    }
}
