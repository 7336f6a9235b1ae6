use crate::header::{headers_match, widen_header};
use crate::model::{HeaderGroup, MergedTable, RawTable};
use crate::table_parse::normalize_rows;

/// Stable partition of `tables` by header. Each table joins the first group,
/// in creation order, whose reference header matches its own.
#[must_use]
pub fn group_tables(tables: Vec<RawTable>) -> Vec<HeaderGroup> {
    let mut groups: Vec<HeaderGroup> = Vec::new();

    for table in tables {
        match groups
            .iter_mut()
            .find(|group| headers_match(&table.header, &group.reference_header))
        {
            Some(group) => group.members.push(table),
            None => groups.push(HeaderGroup {
                reference_header: table.header.clone(),
                members: vec![table],
            }),
        }
    }

    groups
}

#[must_use]
pub fn merge_group(group: &HeaderGroup) -> MergedTable {
    let width = group
        .members
        .iter()
        .flat_map(|table| table.body.iter().map(Vec::len))
        .max()
        .unwrap_or(0)
        .max(group.reference_header.len());

    let mut rows = Vec::new();
    for table in &group.members {
        rows.extend(normalize_rows(&table.body, width));
    }

    MergedTable {
        reference_header: group.reference_header.clone(),
        headers: widen_header(&group.reference_header, width),
        rows,
        source_tables: group.members.iter().map(|table| table.index).collect(),
    }
}

#[must_use]
pub fn group_and_merge(tables: Vec<RawTable>) -> Vec<MergedTable> {
    group_tables(tables).iter().map(merge_group).collect()
}
