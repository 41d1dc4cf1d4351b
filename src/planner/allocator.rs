//! Greedy distribution of ordered courses into semesters.

use crate::models::{Course, Semester, Term};

/// Academic years covered by a generated calendar.
pub const PLANNING_YEARS: i32 = 4;

/// Result of filling a calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub semesters: Vec<Semester>,
    /// Courses that did not fit before the calendar ran out, in order.
    pub unplaced: Vec<Course>,
}

/// Empty semesters for four academic years starting in the fall of
/// `start_year`: Fall, Winter and, when requested, Spring/Summer.
pub fn build_calendar(start_year: i32, include_summer: bool) -> Vec<Semester> {
    let per_year = if include_summer { 3 } else { 2 };
    let mut semesters = Vec::with_capacity((PLANNING_YEARS * per_year) as usize);

    for k in 0..PLANNING_YEARS {
        semesters.push(Semester::new(Term::Fall, start_year + k));
        semesters.push(Semester::new(Term::Winter, start_year + k + 1));
        if include_summer {
            semesters.push(Semester::new(Term::SpringSummer, start_year + k + 1));
        }
    }

    semesters
}

/// Walks `ordered` once, appending each course to the current semester and
/// moving on whenever the next course would push it over
/// `max_credits_per_semester`. A course larger than the cap on its own ends
/// up alone in a semester.
///
/// Spring/Summer slots are skipped unless `include_summer` is set. Courses
/// left over once the calendar is exhausted are returned in
/// [`Allocation::unplaced`].
pub fn allocate(
    ordered: &[Course],
    mut calendar: Vec<Semester>,
    max_credits_per_semester: u32,
    include_summer: bool,
) -> Allocation {
    let mut index = 0;
    let mut credits = 0;
    let mut unplaced = Vec::new();

    for (pos, course) in ordered.iter().enumerate() {
        if credits + course.credits > max_credits_per_semester {
            index += 1;
            credits = 0;
            while !include_summer
                && calendar
                    .get(index)
                    .is_some_and(|s| s.term == Term::SpringSummer)
            {
                index += 1;
            }
        }

        let Some(semester) = calendar.get_mut(index) else {
            unplaced.extend(ordered[pos..].iter().cloned());
            break;
        };
        semester.courses.push(course.clone());
        credits += course.credits;
    }

    Allocation {
        semesters: calendar,
        unplaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, credits: u32) -> Course {
        Course {
            id: code.to_lowercase(),
            code: code.to_string(),
            name: code.to_string(),
            credits,
            prerequisites: Vec::new(),
            corequisites: Vec::new(),
            description: None,
            terms_offered: Vec::new(),
            category: None,
            topics: Vec::new(),
            career_relevance: Vec::new(),
        }
    }

    fn credit_courses(credits: &[u32]) -> Vec<Course> {
        credits
            .iter()
            .enumerate()
            .map(|(i, c)| course(&format!("C {i}"), *c))
            .collect()
    }

    #[test]
    fn calendar_without_summer() {
        let cal = build_calendar(2024, false);
        assert_eq!(cal.len(), 8);
        assert_eq!((cal[0].term, cal[0].year), (Term::Fall, 2024));
        assert_eq!((cal[1].term, cal[1].year), (Term::Winter, 2025));
        assert_eq!((cal[7].term, cal[7].year), (Term::Winter, 2028));
        assert!(cal.iter().all(|s| s.courses.is_empty()));
    }

    #[test]
    fn calendar_with_summer_is_chronological() {
        let cal = build_calendar(2024, true);
        assert_eq!(cal.len(), 12);
        assert_eq!((cal[2].term, cal[2].year), (Term::SpringSummer, 2025));
        assert_eq!((cal[3].term, cal[3].year), (Term::Fall, 2025));
        let terms: Vec<(Term, i32)> = cal[..6].iter().map(|s| (s.term, s.year)).collect();
        assert_eq!(
            terms,
            vec![
                (Term::Fall, 2024),
                (Term::Winter, 2025),
                (Term::SpringSummer, 2025),
                (Term::Fall, 2025),
                (Term::Winter, 2026),
                (Term::SpringSummer, 2026),
            ]
        );

        let mut ids: Vec<_> = cal.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn exact_fit_then_spill() {
        let courses = credit_courses(&[4, 4, 4, 3, 3]);
        let alloc = allocate(&courses, build_calendar(2024, false), 15, false);
        assert_eq!(alloc.semesters[0].courses.len(), 4);
        assert_eq!(alloc.semesters[0].total_credits(), 15);
        assert_eq!(alloc.semesters[1].term, Term::Winter);
        assert_eq!(alloc.semesters[1].courses.len(), 1);
        assert_eq!(alloc.semesters[1].total_credits(), 3);
        assert!(alloc.unplaced.is_empty());
    }

    #[test]
    fn cap_holds_except_single_oversized_course() {
        let courses = credit_courses(&[3, 4, 6, 2, 5, 5, 1, 3, 4]);
        let alloc = allocate(&courses, build_calendar(2024, false), 6, false);
        for s in &alloc.semesters {
            assert!(s.total_credits() <= 6 || s.courses.len() == 1);
        }
        let placed: usize = alloc.semesters.iter().map(|s| s.courses.len()).sum();
        assert_eq!(placed, courses.len());
    }

    #[test]
    fn oversized_course_sits_alone() {
        let courses = credit_courses(&[2, 8, 2]);
        let alloc = allocate(&courses, build_calendar(2024, false), 5, false);
        assert_eq!(alloc.semesters[0].total_credits(), 2);
        assert_eq!(alloc.semesters[1].courses.len(), 1);
        assert_eq!(alloc.semesters[1].total_credits(), 8);
        assert_eq!(alloc.semesters[2].total_credits(), 2);
    }

    #[test]
    fn summer_slots_skipped_when_not_included() {
        let courses = credit_courses(&[3; 12]);
        let alloc = allocate(&courses, build_calendar(2024, true), 6, false);
        assert!(
            alloc
                .semesters
                .iter()
                .filter(|s| s.term == Term::SpringSummer)
                .all(|s| s.courses.is_empty())
        );
        assert_eq!(alloc.semesters[3].term, Term::Fall);
        assert_eq!(alloc.semesters[3].courses.len(), 2);
    }

    #[test]
    fn summer_slots_used_when_included() {
        let courses = credit_courses(&[3; 6]);
        let alloc = allocate(&courses, build_calendar(2024, true), 6, true);
        assert_eq!(alloc.semesters[2].term, Term::SpringSummer);
        assert_eq!(alloc.semesters[2].courses.len(), 2);
    }

    #[test]
    fn overflow_reports_unplaced_in_order() {
        let courses = credit_courses(&[5; 10]);
        let alloc = allocate(&courses, build_calendar(2024, false), 5, false);
        assert!(alloc.semesters.iter().all(|s| s.courses.len() == 1));
        let left: Vec<_> = alloc.unplaced.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(left, vec!["C 8", "C 9"]);
    }

    #[test]
    fn empty_input_leaves_calendar_empty() {
        let alloc = allocate(&[], build_calendar(2030, false), 15, false);
        assert_eq!(alloc.semesters.len(), 8);
        assert!(alloc.semesters.iter().all(|s| s.courses.is_empty()));
    }
}
