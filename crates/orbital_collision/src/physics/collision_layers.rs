//! Faction masks for filtering collision detection
//!
//! A faction is a same-side exclusion mask: two elements whose masks share
//! any set bit never collide. Every bit stands for one kind of participant,
//! and an element carries the bits of everything it must ignore.

use bitflags::bitflags;

bitflags! {
    /// Same-side exclusion mask carried by every collision element
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Faction: u32 {
        /// The player's cruiser in orbit
        const PLAYER = 1 | 2 | 4;

        /// Flak and railgun rounds fired by the player
        const PLAYER_BULLET = 2 | 4;

        /// Nukes fired by the player
        const PLAYER_MISSILE = 4;

        /// Missile silos on the planet surface
        const ENEMY = 8 | 16;

        /// Anti-ship missiles launched by the silos
        const ENEMY_MISSILE = 16;

        /// Cities on the planet surface; only nukes reach them
        const CITY = 1 | 2 | 8 | 16;
    }
}

impl Faction {
    /// Check if two elements may collide based on their factions
    ///
    /// # Example
    /// ```
    /// use orbital_collision::physics::Faction;
    ///
    /// assert!(Faction::can_collide(Faction::PLAYER_BULLET, Faction::ENEMY_MISSILE));
    /// assert!(!Faction::can_collide(Faction::PLAYER, Faction::PLAYER_BULLET));
    /// ```
    pub fn can_collide(a: Self, b: Self) -> bool {
        !a.intersects(b)
    }

    /// Build a custom mask from raw bits, keeping bits outside the stock set
    pub fn from_mask(mask: u32) -> Self {
        Self::from_bits_retain(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_side_never_collides() {
        assert!(!Faction::can_collide(Faction::PLAYER, Faction::PLAYER_BULLET));
        assert!(!Faction::can_collide(Faction::PLAYER_BULLET, Faction::PLAYER_MISSILE));
        assert!(!Faction::can_collide(Faction::ENEMY, Faction::ENEMY_MISSILE));
    }

    #[test]
    fn test_opposing_sides_collide() {
        assert!(Faction::can_collide(Faction::PLAYER, Faction::ENEMY));
        assert!(Faction::can_collide(Faction::PLAYER_MISSILE, Faction::ENEMY_MISSILE));
        assert!(Faction::can_collide(Faction::CITY, Faction::PLAYER_MISSILE));
    }

    #[test]
    fn test_cities_ignore_everything_but_nukes() {
        assert!(!Faction::can_collide(Faction::CITY, Faction::PLAYER));
        assert!(!Faction::can_collide(Faction::CITY, Faction::PLAYER_BULLET));
        assert!(!Faction::can_collide(Faction::CITY, Faction::ENEMY_MISSILE));
        assert!(!Faction::can_collide(Faction::CITY, Faction::ENEMY));
    }

    #[test]
    fn test_empty_mask_collides_with_everything() {
        assert!(Faction::can_collide(Faction::empty(), Faction::all()));
        assert!(Faction::can_collide(Faction::from_mask(1 << 20), Faction::all()));
        assert!(!Faction::can_collide(Faction::from_mask(1 << 20), Faction::from_mask(1 << 20)));
    }
}
