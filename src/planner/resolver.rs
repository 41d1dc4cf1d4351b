//! Prerequisite ordering.
//!
//! Courses are visited depth-first in input order, each one emitted after
//! the prerequisites that are part of the same set. Prerequisites outside
//! the set count as already satisfied.
//!
//! A prerequisite cycle does not fail: a course met again while it is still
//! being visited is skipped, so the ordering honours every edge except the
//! one that closes the cycle.

use std::collections::HashMap;

use crate::models::Course;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Orders `courses` so every course follows its in-set prerequisites.
///
/// Duplicate codes are collapsed onto the first occurrence.
pub fn order(courses: &[Course]) -> Vec<Course> {
    let mut by_code: HashMap<&str, &Course> = HashMap::with_capacity(courses.len());
    let mut roots: Vec<&Course> = Vec::with_capacity(courses.len());
    for course in courses {
        if !by_code.contains_key(course.code.as_str()) {
            by_code.insert(course.code.as_str(), course);
            roots.push(course);
        }
    }

    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(roots.len());
    let mut ordered = Vec::with_capacity(roots.len());

    for root in roots {
        if marks.contains_key(root.code.as_str()) {
            continue;
        }

        // (course, index of the next prerequisite to look at)
        let mut stack: Vec<(&Course, usize)> = vec![(root, 0)];
        marks.insert(root.code.as_str(), Mark::Visiting);

        while let Some(top) = stack.last_mut() {
            let course = top.0;
            if let Some(prereq) = course.prerequisites.get(top.1) {
                top.1 += 1;
                let Some(&dep) = by_code.get(prereq.as_str()) else {
                    continue;
                };
                if marks.contains_key(dep.code.as_str()) {
                    continue;
                }
                marks.insert(dep.code.as_str(), Mark::Visiting);
                stack.push((dep, 0));
            } else {
                marks.insert(course.code.as_str(), Mark::Visited);
                ordered.push(course.clone());
                stack.pop();
            }
        }
    }

    debug_assert!(marks.values().all(|m| *m == Mark::Visited));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, prereqs: &[&str]) -> Course {
        Course {
            id: code.to_lowercase().replace(' ', ""),
            code: code.to_string(),
            name: code.to_string(),
            credits: 3,
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
            corequisites: Vec::new(),
            description: None,
            terms_offered: Vec::new(),
            category: None,
            topics: Vec::new(),
            career_relevance: Vec::new(),
        }
    }

    fn codes(courses: &[Course]) -> Vec<&str> {
        courses.iter().map(|c| c.code.as_str()).collect()
    }

    fn position(courses: &[Course], code: &str) -> usize {
        courses.iter().position(|c| c.code == code).unwrap()
    }

    #[test]
    fn chain_given_in_reverse_is_reordered() {
        let input = vec![
            course("CS 240", &["CS 235"]),
            course("CS 235", &["CS 142"]),
            course("CS 142", &[]),
        ];
        let ordered = order(&input);
        assert_eq!(codes(&ordered), vec!["CS 142", "CS 235", "CS 240"]);
    }

    #[test]
    fn prerequisites_outside_the_set_are_ignored() {
        let input = vec![course("MATH 290", &["MATH 113"]), course("STAT 121", &[])];
        let ordered = order(&input);
        assert_eq!(codes(&ordered), vec!["MATH 290", "STAT 121"]);
    }

    #[test]
    fn every_edge_in_a_diamond_is_honoured() {
        let input = vec![
            course("D", &["B", "C"]),
            course("C", &["A"]),
            course("B", &["A"]),
            course("A", &[]),
            course("E", &[]),
        ];
        let ordered = order(&input);
        assert_eq!(ordered.len(), 5);
        for c in &input {
            for p in &c.prerequisites {
                assert!(position(&ordered, p) < position(&ordered, &c.code));
            }
        }
    }

    #[test]
    fn duplicates_collapse_to_one_entry() {
        let input = vec![
            course("CS 235", &["CS 142"]),
            course("CS 142", &[]),
            course("CS 235", &["CS 142"]),
        ];
        let ordered = order(&input);
        assert_eq!(codes(&ordered), vec!["CS 142", "CS 235"]);
    }

    #[test]
    fn cycle_terminates_with_each_course_once() {
        let input = vec![course("A", &["B"]), course("B", &["A"])];
        let first = order(&input);
        assert_eq!(codes(&first), vec!["B", "A"]);
        assert_eq!(order(&input), first);
    }

    #[test]
    fn self_prerequisite_is_tolerated() {
        let input = vec![course("A", &["A"])];
        assert_eq!(codes(&order(&input)), vec!["A"]);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let n: usize = 5_000;
        let input: Vec<Course> = (0..n)
            .rev()
            .map(|i| {
                let code = format!("C {i}");
                let prev = format!("C {}", i.saturating_sub(1));
                if i == 0 {
                    course(&code, &[])
                } else {
                    course(&code, &[prev.as_str()])
                }
            })
            .collect();
        let ordered = order(&input);
        assert_eq!(ordered.len(), n);
        assert_eq!(ordered[0].code, "C 0");
        assert_eq!(ordered[n - 1].code, format!("C {}", n - 1));
    }

    #[test]
    fn catalog_required_courses_order_cleanly() {
        let catalog = crate::catalog::Catalog::builtin().unwrap();
        let reqs = catalog.requirements("cs").unwrap();
        let input: Vec<Course> = reqs
            .required_courses
            .iter()
            .filter_map(|code| catalog.course(code).cloned())
            .collect();
        let ordered = order(&input);
        assert_eq!(ordered.len(), input.len());
        assert!(position(&ordered, "MATH 112") < position(&ordered, "MATH 113"));
        assert!(position(&ordered, "MATH 113") < position(&ordered, "MATH 290"));
        assert!(position(&ordered, "CS 142") < position(&ordered, "CS 235"));
    }
}
