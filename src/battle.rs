//! Turn-based one-on-one battle simulation.
//!
//! The machine moves `Idle -> Loading -> Ready -> InProgress -> Concluded`.
//! Both participants are fetched fresh on every start, so a rematch always
//! begins at full HP.

use crate::config::BattleDefaults;
use crate::damage::{self, DamageReport};
use crate::error::AppError;
use crate::pokemon::PokemonSnapshot;
use crate::provider::DataProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    Idle,
    Loading,
    Ready,
    InProgress,
    Concluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleParticipant {
    pub snapshot: PokemonSnapshot,
    pub current_hp: u32,
    pub max_hp: u32,
}

impl BattleParticipant {
    /// Full-HP participant. Max HP is the `hp` base stat.
    pub fn new(snapshot: PokemonSnapshot, defaults: &BattleDefaults) -> Self {
        let max_hp = snapshot.stat("hp").unwrap_or(defaults.default_hp).max(1);
        Self {
            snapshot,
            current_hp: max_hp,
            max_hp,
        }
    }

    pub fn name(&self) -> &str {
        &self.snapshot.name
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn hp_percentage(&self) -> f64 {
        self.current_hp as f64 / self.max_hp as f64 * 100.0
    }

    fn speed(&self) -> u32 {
        self.snapshot.stat("speed").unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    /// The defender survived and the turn passed to it.
    Hit(DamageReport),
    /// The defender fainted.
    Victory { winner: String, report: DamageReport },
    /// Nothing happened because a participant had already fainted.
    AlreadyConcluded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleState {
    pub participant_a: BattleParticipant,
    pub participant_b: BattleParticipant,
    pub active_attacker: Side,
    pub winner: Option<String>,
}

impl BattleState {
    pub fn participant(&self, side: Side) -> &BattleParticipant {
        match side {
            Side::A => &self.participant_a,
            Side::B => &self.participant_b,
        }
    }

    fn participant_mut(&mut self, side: Side) -> &mut BattleParticipant {
        match side {
            Side::A => &mut self.participant_a,
            Side::B => &mut self.participant_b,
        }
    }
}

pub struct BattleStateMachine<P> {
    provider: P,
    defaults: BattleDefaults,
    phase: BattlePhase,
    ids: Option<(String, String)>,
    state: Option<BattleState>,
    log: Vec<String>,
}

impl<P: DataProvider> BattleStateMachine<P> {
    pub fn new(provider: P, defaults: BattleDefaults) -> Self {
        Self {
            provider,
            defaults,
            phase: BattlePhase::Idle,
            ids: None,
            state: None,
            log: Vec::new(),
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn state(&self) -> Option<&BattleState> {
        self.state.as_ref()
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn winner(&self) -> Option<&str> {
        self.state.as_ref().and_then(|s| s.winner.as_deref())
    }

    pub fn active_attacker(&self) -> Option<&BattleParticipant> {
        self.state
            .as_ref()
            .map(|s| s.participant(s.active_attacker))
    }

    /// Fetch both participants and begin a battle between them.
    ///
    /// Both fetches run concurrently. If either fails the machine returns to
    /// `Idle` with no participants and the failure is written to the log.
    pub async fn start(&mut self, id_a: &str, id_b: &str) -> Result<(), AppError> {
        self.ids = Some((id_a.to_string(), id_b.to_string()));
        self.state = None;
        self.log = vec!["Battle started!".to_string()];
        self.phase = BattlePhase::Loading;

        let (a, b) = tokio::join!(
            self.provider.get_pokemon(id_a),
            self.provider.get_pokemon(id_b)
        );

        let (a, b) = match (a, b) {
            (Ok(a), Ok(b)) => (a, b),
            (a, b) => {
                let mut first_error = None;
                for (id, result) in [(id_a, a), (id_b, b)] {
                    if let Err(e) = result {
                        tracing::error!("Failed to load pokemon {}: {}", id, e);
                        self.log.push(format!("Error loading Pokémon {}.", id));
                        first_error.get_or_insert(e);
                    }
                }
                self.log
                    .push("Failed to load one or both Pokémon. Cannot start battle.".to_string());
                self.phase = BattlePhase::Idle;
                return Err(first_error
                    .unwrap_or_else(|| AppError::InvalidState("battle setup failed".to_string())));
            }
        };

        let participant_a = BattleParticipant::new(a, &self.defaults);
        let participant_b = BattleParticipant::new(b, &self.defaults);
        self.phase = BattlePhase::Ready;

        // ties go to A
        let first = if participant_a.speed() >= participant_b.speed() {
            Side::A
        } else {
            Side::B
        };
        let state = BattleState {
            participant_a,
            participant_b,
            active_attacker: first,
            winner: None,
        };

        let first_name = state.participant(first).name().to_string();
        tracing::info!(
            "Battle {} vs {}: {} attacks first",
            state.participant_a.name(),
            state.participant_b.name(),
            first_name
        );
        self.log.push(format!("{} will attack first!", first_name));
        self.state = Some(state);
        self.phase = BattlePhase::InProgress;
        Ok(())
    }

    /// Re-fetch the same two participants and start over at full HP.
    pub async fn restart(&mut self) -> Result<(), AppError> {
        let Some((id_a, id_b)) = self.ids.clone() else {
            return Err(AppError::InvalidState(
                "no previous battle to restart".to_string(),
            ));
        };
        self.start(&id_a, &id_b).await
    }

    /// The active attacker hits the other participant once.
    pub fn attack(&mut self) -> Result<AttackOutcome, AppError> {
        match self.phase {
            BattlePhase::InProgress | BattlePhase::Concluded => {}
            phase => {
                return Err(AppError::InvalidState(format!(
                    "cannot attack while {:?}",
                    phase
                )));
            }
        }
        let Some(state) = self.state.as_mut() else {
            return Err(AppError::InvalidState("no participants loaded".to_string()));
        };

        let attacker_side = state.active_attacker;
        let defender_side = attacker_side.opponent();
        if state.participant_a.is_fainted() || state.participant_b.is_fainted() {
            self.log.push("Battle has already concluded.".to_string());
            return Ok(AttackOutcome::AlreadyConcluded);
        }

        let report = damage::calculate(
            state.participant(attacker_side),
            state.participant(defender_side),
            &self.defaults,
        );
        let attacker_name = state.participant(attacker_side).name().to_string();

        let defender = state.participant_mut(defender_side);
        defender.current_hp = defender.current_hp.saturating_sub(report.damage);
        let defender_name = defender.name().to_string();
        let fainted = defender.is_fainted();

        let mut message = format!(
            "{} attacks {} with a {}-type move for {} damage.",
            attacker_name, defender_name, report.attack_type, report.damage
        );
        if let Some(commentary) = report.commentary() {
            message.push(' ');
            message.push_str(commentary);
        }
        self.log.push(message);

        if fainted {
            self.log.push(format!(
                "{} fainted! {} wins!",
                defender_name, attacker_name
            ));
            state.winner = Some(attacker_name.clone());
            self.phase = BattlePhase::Concluded;
            tracing::info!("Battle concluded, {} wins", attacker_name);
            return Ok(AttackOutcome::Victory {
                winner: attacker_name,
                report,
            });
        }

        state.active_attacker = defender_side;
        self.log.push(format!("It's now {}'s turn.", defender_name));
        Ok(AttackOutcome::Hit(report))
    }
}
