use rand::Rng;

/// Decides which side the target goes on when the choices appear.
pub trait SideAssignment {
    fn target_on_left(&mut self) -> bool;
}

/// Fair coin flip.
impl<R: Rng> SideAssignment for R {
    fn target_on_left(&mut self) -> bool {
        self.random_bool(0.5)
    }
}

/// Always puts the target on the same side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSide(pub bool);

impl SideAssignment for FixedSide {
    fn target_on_left(&mut self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn coin_flip_is_roughly_fair() {
        let mut rng = StdRng::seed_from_u64(7);
        let lefts = (0..10_000).filter(|_| rng.target_on_left()).count();
        assert!((4_500..5_500).contains(&lefts), "lefts = {lefts}");
    }

    #[test]
    fn fixed_side_never_changes() {
        let mut side = FixedSide(false);
        assert!((0..10).all(|_| !side.target_on_left()));
    }
}
