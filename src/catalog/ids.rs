use uuid::Uuid;

use crate::entities::project::ProjectRecord;

/// Largest integer a JSON number carries without loss.
pub const MAX_SAFE_ID: u64 = (1 << 53) - 1;

/// Id for a record that exists only locally.
///
/// Drawn from a random UUID rather than the clock, so records created in
/// the same millisecond still get distinct ids.
pub fn local_id(existing: &[ProjectRecord]) -> i64 {
    local_id_from(existing, || Uuid::new_v4().as_u128())
}

pub(crate) fn local_id_from(existing: &[ProjectRecord], mut draw: impl FnMut() -> u128) -> i64 {
    loop {
        let candidate = ((draw() as u64) & MAX_SAFE_ID) as i64;
        if candidate != 0 && !existing.iter().any(|p| p.id == candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed::seed_projects;

    #[test]
    fn ids_are_positive_and_json_safe() {
        for _ in 0..1000 {
            let id = local_id(&[]);
            assert!(id > 0);
            assert!(id as u64 <= MAX_SAFE_ID);
        }
    }

    #[test]
    fn colliding_and_zero_draws_are_redrawn() {
        let existing = seed_projects();
        let mut draws = vec![0u128, 1, 2, 42].into_iter();

        let id = local_id_from(&existing, || draws.next().unwrap_or(7));

        assert_eq!(id, 42);
    }
}
