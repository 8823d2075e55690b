//! SSL grade ordering and aggregation.
//!
//! Grades rank `A+ > A- > A > B > C > D > E > F > T > M`, and anything below
//! `M` is [`UNGRADED`]. The overall grade of an evaluation is the worst grade
//! among its servers.

use crate::model::Server;

/// Sentinel for an evaluation that cannot be graded.
pub const UNGRADED: &str = "NaN";

/// Known grades, worst first.
const GRADE_ORDER: &[&str] = &["M", "T", "F", "E", "D", "C", "B", "A", "A-", "A+"];

/// Rank of a grade code; higher is better.
///
/// Empty and sentinel grades have no rank. Unrecognised non-empty codes rank
/// with `M`.
pub fn grade_rank(grade: &str) -> Option<usize> {
    if grade.is_empty() || grade == UNGRADED {
        return None;
    }
    Some(GRADE_ORDER.iter().position(|g| *g == grade).unwrap_or(0))
}

/// Worst grade across `servers`.
///
/// No servers, or any server without a grade, yields [`UNGRADED`]. When several
/// servers share the lowest rank the first one seen wins.
pub fn worst_grade(servers: &[Server]) -> String {
    let mut worst: Option<(usize, &str)> = None;

    for server in servers {
        let Some(rank) = grade_rank(&server.ssl_grade) else {
            return UNGRADED.to_string();
        };
        match worst {
            Some((lowest, _)) if rank >= lowest => {}
            _ => worst = Some((rank, server.ssl_grade.as_str())),
        }
    }

    worst.map_or_else(|| UNGRADED.to_string(), |(_, grade)| grade.to_string())
}
