use crate::metadata::MetadataRecord;

/// Picks the charge event to pair with the discharge at `discharge_uid`.
///
/// Prefers the first charge strictly after the discharge and falls back to the
/// last charge strictly before it. `charges` must be sorted by `uid`.
pub fn select_charge<'a>(
    discharge_uid: i64,
    charges: &[&'a MetadataRecord],
) -> Option<&'a MetadataRecord> {
    charges
        .iter()
        .find(|c| c.uid > discharge_uid)
        .or_else(|| charges.iter().rev().find(|c| c.uid < discharge_uid))
        .copied()
}
