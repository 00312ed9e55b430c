//! Root components of a kanji: the smallest ordered set of components whose
//! strokes together cover every stroke any component covers.

use std::collections::HashMap;

/// Indices of the root components, in declaration order.
///
/// `components[i]` lists the stroke indices owned by component `i`. Selection
/// is greedy on newly covered strokes with the earlier component winning ties,
/// then any chosen component made redundant by the others is dropped, last
/// first. On the nested stroke sets a component tree produces this is the
/// exact minimum.
pub fn root_components<S: AsRef<[usize]>>(components: &[S]) -> Vec<usize> {
    let mut covered: HashMap<usize, usize> = HashMap::new();
    let mut chosen: Vec<usize> = Vec::new();

    loop {
        let mut best: Option<(usize, usize)> = None;
        for (index, strokes) in components.iter().enumerate() {
            if chosen.contains(&index) {
                continue;
            }
            let mut gain = strokes.as_ref().to_vec();
            gain.sort_unstable();
            gain.dedup();
            let gain = gain.iter().filter(|s| !covered.contains_key(s)).count();
            if gain > best.map_or(0, |(_, g)| g) {
                best = Some((index, gain));
            }
        }

        let Some((index, _)) = best else { break };
        for stroke in components[index].as_ref() {
            *covered.entry(*stroke).or_default() += 1;
        }
        chosen.push(index);
    }

    chosen.sort_unstable();

    // A later component loses to earlier ones when it adds nothing
    for position in (0..chosen.len()).rev() {
        let strokes = components[chosen[position]].as_ref();
        let redundant = strokes
            .iter()
            .all(|s| covered.get(s).copied().unwrap_or(0) > count_in(strokes, *s));
        if redundant {
            for stroke in strokes {
                if let Some(count) = covered.get_mut(stroke) {
                    *count -= 1;
                }
            }
            chosen.remove(position);
        }
    }

    chosen
}

fn count_in(strokes: &[usize], stroke: usize) -> usize {
    strokes.iter().filter(|s| **s == stroke).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_component_is_not_a_root() {
        // 2 is inside 1, 3 is disjoint
        let components = vec![vec![0, 1, 2], vec![1, 2], vec![3, 4]];
        assert_eq!(root_components(&components), vec![0, 2]);
    }

    #[test]
    fn nested_tree_keeps_top_level_only() {
        // 猫: 犭(0..3) and 苗(3..11) with 艹 and 田 nested in 苗
        let components = vec![
            vec![0, 1, 2],
            (3..11).collect::<Vec<_>>(),
            vec![3, 4, 5],
            vec![6, 7, 8, 9, 10],
        ];
        assert_eq!(root_components(&components), vec![0, 1]);
    }

    #[test]
    fn earlier_component_wins_ties() {
        let components = vec![vec![0, 1], vec![0, 1], vec![2]];
        assert_eq!(root_components(&components), vec![0, 2]);
    }

    #[test]
    fn later_superset_replaces_earlier_parts() {
        let components = vec![vec![0], vec![1], vec![0, 1]];
        assert_eq!(root_components(&components), vec![2]);
    }

    #[test]
    fn empty_components_are_never_roots() {
        let components: Vec<Vec<usize>> = vec![vec![], vec![0]];
        assert_eq!(root_components(&components), vec![1]);
        let none: Vec<Vec<usize>> = Vec::new();
        assert!(root_components(&none).is_empty());
    }
}
