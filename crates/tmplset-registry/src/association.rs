//! The association pass
//!
//! Makes every member able to include every other member by fully-qualified
//! name. The check is by name only: a member that already resolves a name
//! keeps its existing association, even if the template behind that name has
//! been re-imported with different text.
//!
//! All members are gathered into one [`AssociationBatch`] first, so each
//! member is merged with the rest of the set once per pass.

use std::collections::BTreeMap;

use tmplset::{AssociationBatch, Template, TemplateError};
use tracing::debug;

/// Associate every ordered pair of members
///
/// Returns the number of associations added; zero when the pass is repeated
/// without new members. Stops at the first refused attachment, keeping the
/// ones made before it.
pub(crate) fn associate_all(members: &mut BTreeMap<String, Template>) -> Result<usize, TemplateError> {
    let total = members.len();
    // Associations only ever name members, so a full count means a full mesh
    if members.values().all(|member| member.associations().count() == total) {
        return Ok(0);
    }

    let mut batch = AssociationBatch::new();
    for member in members.values() {
        batch.add(&member.compiled())?;
    }

    let mut added = 0;
    for member in members.values_mut() {
        added += member.associate_batch(&batch)?;
    }

    debug!(
        "Association pass over {} members added {} links",
        total,
        added
    );
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmplset::{SharedFunctions, TemplateKind};

    fn members(names: &[&str]) -> BTreeMap<String, Template> {
        names
            .iter()
            .map(|name| {
                let template = Template::parse(
                    "app",
                    TemplateKind::Regular,
                    *name,
                    *name,
                    &SharedFunctions::new(),
                    true,
                )
                .unwrap();
                (template.name().to_string(), template)
            })
            .collect()
    }

    #[test]
    fn test_full_mesh() {
        let mut members = members(&["a", "b", "c"]);

        assert_eq!(associate_all(&mut members).unwrap(), 6);
        for member in members.values() {
            let names: Vec<_> = member.associations().collect();
            assert_eq!(names, vec!["app/a", "app/b", "app/c"]);
        }
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let mut members = members(&["a", "b"]);

        associate_all(&mut members).unwrap();
        let before: Vec<Vec<String>> = members
            .values()
            .map(|m| m.associations().map(String::from).collect())
            .collect();

        assert_eq!(associate_all(&mut members).unwrap(), 0);
        let after: Vec<Vec<String>> = members
            .values()
            .map(|m| m.associations().map(String::from).collect())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_new_member_joins_existing_mesh() {
        let mut set = members(&["a", "b"]);
        associate_all(&mut set).unwrap();

        set.extend(members(&["c"]));
        assert_eq!(associate_all(&mut set).unwrap(), 4);
        assert!(set["app/a"].resolves("app/c"));
        assert!(set["app/c"].resolves("app/b"));
    }

    #[test]
    fn test_hundreds_of_members() {
        let names: Vec<String> = (0..300).map(|i| format!("t{i:03}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut members = members(&names);

        assert_eq!(associate_all(&mut members).unwrap(), 300 * 299);
        assert!(members.values().all(|m| m.associations().count() == 300));
        assert_eq!(associate_all(&mut members).unwrap(), 0);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(associate_all(&mut BTreeMap::new()).unwrap(), 0);
        assert_eq!(associate_all(&mut members(&["solo"])).unwrap(), 0);
    }
}
