//! Simplified damage formula for the battle simulator.

use crate::battle::BattleParticipant;
use crate::config::BattleDefaults;
use crate::effectiveness;

/// Fixed level the formula is evaluated at.
const LEVEL: f64 = 50.0;
/// Fixed move power.
const POWER: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DamageReport {
    pub damage: u32,
    pub attack_type: String,
    pub effectiveness: f64,
}

impl DamageReport {
    /// Battle-log commentary for the effectiveness, if any.
    pub fn commentary(&self) -> Option<&'static str> {
        if self.effectiveness > 1.0 {
            Some("It's super effective!")
        } else if self.effectiveness > 0.0 && self.effectiveness < 1.0 {
            Some("It's not very effective...")
        } else if self.effectiveness == 0.0 {
            Some("It has no effect!")
        } else {
            None
        }
    }
}

/// Damage `attacker` deals to `defender` with a move of its first type.
///
/// Always at least 1, even when the defender is immune.
pub fn compute_damage(
    attacker: &BattleParticipant,
    defender: &BattleParticipant,
    defaults: &BattleDefaults,
) -> u32 {
    calculate(attacker, defender, defaults).damage
}

pub fn calculate(
    attacker: &BattleParticipant,
    defender: &BattleParticipant,
    defaults: &BattleDefaults,
) -> DamageReport {
    let attack = attacker
        .snapshot
        .stat("attack")
        .unwrap_or(defaults.default_attack);
    let defense = defender
        .snapshot
        .stat("defense")
        .unwrap_or(defaults.default_defense);
    let attack_type = attacker
        .snapshot
        .types
        .first()
        .cloned()
        .unwrap_or_else(|| defaults.fallback_attack_type.clone());

    let effectiveness = effectiveness::resolve(&attack_type, &defender.snapshot.types);
    let damage = formula(attack, defense, effectiveness);

    tracing::debug!(
        "{} -> {}: atk={} def={} type={} eff={} dmg={}",
        attacker.snapshot.name,
        defender.snapshot.name,
        attack,
        defense,
        attack_type,
        effectiveness,
        damage
    );

    DamageReport {
        damage,
        attack_type,
        effectiveness,
    }
}

fn formula(attack: u32, defense: u32, effectiveness: f64) -> u32 {
    // a zero defense stat would divide by zero; the provider never reports one
    let defense = defense.max(1) as f64;
    let base = ((2.0 / 5.0 + 2.0) * attack as f64 * POWER / defense) / LEVEL + 2.0;
    let damage = (base * effectiveness).floor();
    (damage as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::{BaseStat, PokemonSnapshot};
    use rstest::rstest;

    fn participant(name: &str, types: &[&str], attack: Option<u32>, defense: Option<u32>) -> BattleParticipant {
        let mut stats = Vec::new();
        if let Some(value) = attack {
            stats.push(BaseStat { name: "attack".to_string(), value });
        }
        if let Some(value) = defense {
            stats.push(BaseStat { name: "defense".to_string(), value });
        }
        BattleParticipant::new(
            PokemonSnapshot {
                id: 1,
                name: name.to_string(),
                types: types.iter().map(|t| t.to_string()).collect(),
                stats,
                ..Default::default()
            },
            &BattleDefaults::default(),
        )
    }

    #[rstest]
    // 2.4 * 52 / 49 + 2 = 4.55, doubled = 9.09
    #[case(&["fire"], Some(52), &["grass", "poison"], Some(49), 9, 2.0)]
    // 2.4 * 49 / 43 + 2 = 4.73, halved = 2.37
    #[case(&["grass", "poison"], Some(49), &["fire"], Some(43), 2, 0.5)]
    // 2.4 * 100 / 50 + 2 = 6.8
    #[case(&["normal"], Some(100), &["water"], Some(50), 6, 1.0)]
    // defaults: 2.4 * 30 / 30 + 2 = 4.4
    #[case(&[], None, &["water"], None, 4, 1.0)]
    fn test_damage_formula(
        #[case] attacker_types: &[&str],
        #[case] attack: Option<u32>,
        #[case] defender_types: &[&str],
        #[case] defense: Option<u32>,
        #[case] expected_damage: u32,
        #[case] expected_effectiveness: f64,
    ) {
        let attacker = participant("attacker", attacker_types, attack, Some(50));
        let defender = participant("defender", defender_types, Some(50), defense);

        let report = calculate(&attacker, &defender, &BattleDefaults::default());
        assert_eq!(report.damage, expected_damage);
        assert_eq!(report.effectiveness, expected_effectiveness);
    }

    #[test]
    fn test_immune_defender_still_takes_one() {
        let attacker = participant("pikachu", &["electric"], Some(55), Some(40));
        let defender = participant("diglett", &["ground"], Some(55), Some(25));

        let report = calculate(&attacker, &defender, &BattleDefaults::default());
        assert_eq!(report.effectiveness, 0.0);
        assert_eq!(report.damage, 1);
        assert_eq!(report.commentary(), Some("It has no effect!"));
    }

    #[test]
    fn test_fallback_attack_type_is_normal() {
        let attacker = participant("missingno", &[], Some(60), Some(60));
        let defender = participant("gastly", &["ghost", "poison"], Some(35), Some(30));

        let report = calculate(&attacker, &defender, &BattleDefaults::default());
        assert_eq!(report.attack_type, "normal");
        assert_eq!(report.damage, 1);
    }

    #[test]
    fn test_damage_is_at_least_one_everywhere() {
        let defaults = BattleDefaults::default();
        for attack in [1, 5, 60, 255] {
            for defense in [1, 60, 255] {
                let attacker = participant("a", &["normal"], Some(attack), Some(50));
                let defender = participant("b", &["rock", "steel"], Some(50), Some(defense));
                let first = compute_damage(&attacker, &defender, &defaults);
                assert!(first >= 1);
                assert_eq!(first, compute_damage(&attacker, &defender, &defaults));
            }
        }
    }

    #[test]
    fn test_commentary() {
        let report = |effectiveness| DamageReport {
            damage: 1,
            attack_type: "fire".to_string(),
            effectiveness,
        };
        assert_eq!(report(4.0).commentary(), Some("It's super effective!"));
        assert_eq!(report(0.25).commentary(), Some("It's not very effective..."));
        assert_eq!(report(1.0).commentary(), None);
    }
}
