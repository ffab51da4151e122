//! Hierarchy builder.
//!
//! GEDCOM encodes nesting with a level number instead of physical nesting.
//! The children of a line at level `L` are the lines at exactly level `L + 1`
//! that follow it, up to the next line at level `L` or shallower. Parents are
//! the exact inverse of children.
//!
//! A line whose level jumps more than one deeper than the line before it has
//! no parent: it is not at level `L + 1` for any open line.

use crate::domain::Line;

/// Computes `children` and `parent` for every line, in a single forward pass.
///
/// Any previous hierarchy on the lines is discarded, so running the builder
/// again over its own output gives the same result.
pub fn build(lines: &mut [Line]) {
    for line in lines.iter_mut() {
        line.children.clear();
        line.parent = None;
    }

    // Positions of the lines that can still receive children, shallowest first.
    let mut open: Vec<usize> = Vec::new();

    for position in 0..lines.len() {
        let level = lines[position].level;

        while open.last().is_some_and(|&p| lines[p].level >= level) {
            open.pop();
        }

        if let Some(&parent) = open.last() {
            if lines[parent].level + 1 == level {
                lines[parent].children.push(position);
                lines[position].parent = Some(parent);
            }
        }

        open.push(position);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::Tag;

    fn lines_at(levels: &[usize]) -> Vec<Line> {
        levels
            .iter()
            .enumerate()
            .map(|(position, &level)| Line {
                level,
                xref: None,
                tag: Tag::Note,
                value: None,
                text: format!("{level} NOTE"),
                line_number: position + 1,
                position,
                children: Vec::new(),
                parent: None,
            })
            .collect()
    }

    fn built(levels: &[usize]) -> Vec<Line> {
        let mut lines = lines_at(levels);
        build(&mut lines);
        lines
    }

    #[test]
    fn nested_record() {
        // 0 INDI / 1 NAME / 1 BIRT / 2 DATE / 1 SEX / 0 TRLR
        let lines = built(&[0, 1, 1, 2, 1, 0]);

        assert_eq!(lines[0].child_positions(), &[1, 2, 4]);
        assert_eq!(lines[2].child_positions(), &[3]);
        assert!(lines[5].child_positions().is_empty());

        assert_eq!(lines[0].parent_position(), None);
        assert_eq!(lines[1].parent_position(), Some(0));
        assert_eq!(lines[3].parent_position(), Some(2));
        assert_eq!(lines[4].parent_position(), Some(0));
        assert_eq!(lines[5].parent_position(), None);
    }

    #[test]
    fn final_line_has_no_children() {
        let lines = built(&[0, 1]);
        assert!(lines[1].child_positions().is_empty());
    }

    #[test]
    fn level_jump_is_orphaned() {
        // 0 / 2 / 1: the level-2 line is not a child of anything
        let lines = built(&[0, 2, 1]);
        assert_eq!(lines[0].child_positions(), &[2]);
        assert_eq!(lines[1].parent_position(), None);
        assert_eq!(lines[2].parent_position(), Some(0));
    }

    #[test]
    fn rebuilding_discards_stale_links() {
        let mut lines = built(&[0, 1, 1]);
        lines[2].level = 0;
        build(&mut lines);
        assert_eq!(lines[0].child_positions(), &[1]);
        assert_eq!(lines[2].parent_position(), None);
    }

    /// Level sequences where each level is at most one deeper than the last.
    fn well_formed_levels() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0usize..4, 0..60).prop_map(|steps| {
            let mut levels = Vec::with_capacity(steps.len());
            let mut previous = 0usize;
            for (i, step) in steps.into_iter().enumerate() {
                let level = if i == 0 { 0 } else { step.min(previous + 1) };
                levels.push(level);
                previous = level;
            }
            levels
        })
    }

    proptest! {
        #[test]
        fn children_are_one_level_deeper(levels in prop::collection::vec(0usize..5, 0..60)) {
            let lines = built(&levels);
            for line in &lines {
                for &child in line.child_positions() {
                    prop_assert_eq!(lines[child].level(), line.level() + 1);
                    prop_assert!(child > line.position());
                }
            }
        }

        #[test]
        fn parent_is_inverse_of_children(levels in prop::collection::vec(0usize..5, 0..60)) {
            let lines = built(&levels);
            for line in &lines {
                for &child in line.child_positions() {
                    prop_assert_eq!(lines[child].parent_position(), Some(line.position()));
                }
                if let Some(parent) = line.parent_position() {
                    prop_assert!(lines[parent].child_positions().contains(&line.position()));
                }
            }
        }

        #[test]
        fn subtree_is_contiguous(levels in well_formed_levels()) {
            let lines = built(&levels);
            for line in &lines {
                // every line between a parent and its last child is deeper than the parent
                if let Some(&last) = line.child_positions().last() {
                    for between in &lines[line.position() + 1..=last] {
                        prop_assert!(between.level() > line.level());
                    }
                }
            }
        }

        #[test]
        fn well_formed_lines_below_top_level_have_a_parent(levels in well_formed_levels()) {
            let lines = built(&levels);
            for line in &lines {
                prop_assert_eq!(line.parent_position().is_some(), line.level() > 0);
            }
        }

        #[test]
        fn rebuilding_is_idempotent(levels in prop::collection::vec(0usize..5, 0..60)) {
            let first = built(&levels);
            let mut second = first.clone();
            build(&mut second);
            prop_assert_eq!(first, second);
        }
    }
}
