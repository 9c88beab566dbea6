//! Demo tactical world: a square map of troopers that walk, turn and shoot.
//!
//! Movement is instant and ballistics are a single percentile roll. The
//! point is to give the event pump realistic traffic: orders that chain
//! into shots, shots that chain into hits and noise, and deaths that leave
//! stale events behind in the queues.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skirmish_core::roster::{RosterError, SoldierRoster};
use skirmish_events::{
    EventDelay, EventProducer, EventSink, GameplayHandlers, SoldierHandle, SoldierRegistry,
};
use skirmish_types::{
    AnimationId, BeginFireWeapon, Direction, FireTarget, FireWeapon, GameEvent, GetNewPath,
    GridNo, HitLocation, Noise, NoiseKind, SetDesiredDirection, SoldierId, SoldierRef,
    WeaponHit, WeaponIndex, WorldPos,
};
use tracing::{debug, info, warn};

/// Tiles per map row.
pub const MAP_COLS: i16 = 40;

/// Total tiles on the map (40 x 40).
pub const MAP_TILES: i16 = 1600;

/// Hit points a trooper deploys with.
pub const TROOPER_HP: i16 = 100;

/// Breath a trooper deploys with.
pub const TROOPER_BREATH: i16 = 100;

const DEFAULT_HIT_PERCENT: u32 = 70;
const FOOTSTEP_VOLUME: u8 = 2;
const GUNFIRE_VOLUME: u8 = 25;
const SCREAM_VOLUME: u8 = 10;

/// Per-trooper state the handlers mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trooper {
    /// Current tile.
    pub grid: GridNo,
    /// Facing.
    pub facing: Direction,
    /// Remaining hit points.
    pub hp: i16,
    /// Remaining breath.
    pub breath: i16,
    /// Last fire target, kept for the follow-up shot.
    pub target: Option<FireTarget>,
    /// Animation used for the last path.
    pub anim: AnimationId,
}

impl Trooper {
    const fn at(grid: GridNo) -> Self {
        Self {
            grid,
            facing: Direction::North,
            hp: TROOPER_HP,
            breath: TROOPER_BREATH,
            target: None,
            anim: AnimationId(0),
        }
    }
}

/// Roster plus trooper state plus a seeded roll source.
#[derive(Debug)]
pub struct DemoWorld {
    roster: SoldierRoster,
    troopers: BTreeMap<SoldierId, Trooper>,
    rng: StdRng,
    hit_percent: u32,
    noises_heard: u64,
}

impl DemoWorld {
    /// Create an empty world with `slots` roster slots.
    pub fn new(slots: u16, seed: u64) -> Self {
        Self {
            roster: SoldierRoster::new(slots),
            troopers: BTreeMap::new(),
            rng: StdRng::seed_from_u64(seed),
            hit_percent: DEFAULT_HIT_PERCENT,
            noises_heard: 0,
        }
    }

    /// Override the chance (0-100) that a shot at an occupied tile hits.
    #[must_use]
    pub const fn with_hit_percent(mut self, percent: u32) -> Self {
        self.hit_percent = if percent > 100 { 100 } else { percent };
        self
    }

    /// The soldier roster.
    pub const fn roster(&self) -> &SoldierRoster {
        &self.roster
    }

    /// State of a living trooper.
    pub fn trooper(&self, id: SoldierId) -> Option<&Trooper> {
        self.troopers.get(&id)
    }

    /// Total listener count over every noise propagated so far.
    pub const fn noises_heard(&self) -> u64 {
        self.noises_heard
    }

    /// Deploy one trooper on `grid`.
    pub fn deploy_at(&mut self, grid: GridNo) -> Result<SoldierRef, RosterError> {
        let soldier = self.roster.spawn()?;
        self.troopers.insert(soldier.id, Trooper::at(grid));
        Ok(soldier)
    }

    /// Deploy `count` troopers on random tiles.
    pub fn deploy(&mut self, count: u16) -> Result<Vec<SoldierRef>, RosterError> {
        let mut deployed = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let grid = self.random_grid();
            deployed.push(self.deploy_at(grid)?);
        }
        Ok(deployed)
    }

    /// Orders for an unscripted session: everyone turns towards a random
    /// opponent and opens fire, half of the squad repositions first, and a
    /// distant explosion goes off. The last trooper also gets an on-demand
    /// turn, as a player would issue between ticks.
    pub fn opening_orders(&mut self) -> Vec<(GameEvent, EventDelay)> {
        let squad: Vec<(SoldierRef, GridNo)> = self
            .roster
            .active()
            .filter_map(|soldier| self.troopers.get(&soldier.id).map(|t| (soldier, t.grid)))
            .collect();
        let mut orders = Vec::new();

        for (slot, &(soldier, grid)) in (0_u16..).zip(&squad) {
            let Some(&(_, target_grid)) = self.pick_other(&squad, soldier) else {
                continue;
            };

            if slot & 1 == 1 {
                let dest = self.random_grid();
                orders.push((
                    GameEvent::GetNewPath(GetNewPath {
                        soldier,
                        dest,
                        movement_anim: AnimationId(1),
                    }),
                    EventDelay::IMMEDIATE,
                ));
            }
            orders.push((
                GameEvent::SetDesiredDirection(SetDesiredDirection {
                    soldier,
                    direction: direction_between(grid, target_grid),
                }),
                EventDelay::Ticks(1),
            ));
            orders.push((
                GameEvent::BeginFireWeapon(BeginFireWeapon {
                    soldier,
                    target: FireTarget {
                        grid: target_grid,
                        level: 0,
                        cube_level: 1,
                    },
                }),
                EventDelay::Ticks(slot.saturating_add(2)),
            ));
        }

        let blast = self.random_grid();
        orders.push((
            GameEvent::Noise(Noise {
                maker: None,
                grid: blast,
                level: 0,
                volume: 40,
                kind: NoiseKind::Explosion,
            }),
            EventDelay::Ticks(5),
        ));

        if let Some(&(soldier, _)) = squad.last() {
            orders.push((
                GameEvent::SetDesiredDirection(SetDesiredDirection {
                    soldier,
                    direction: Direction::South,
                }),
                EventDelay::OnDemand,
            ));
        }
        orders
    }

    fn pick_other<'a>(
        &mut self,
        squad: &'a [(SoldierRef, GridNo)],
        soldier: SoldierRef,
    ) -> Option<&'a (SoldierRef, GridNo)> {
        let others: Vec<&(SoldierRef, GridNo)> =
            squad.iter().filter(|(other, _)| *other != soldier).collect();
        if others.is_empty() {
            return None;
        }
        let pick = self.rng.random_range(0..others.len());
        others.get(pick).copied()
    }

    fn random_grid(&mut self) -> GridNo {
        GridNo(self.rng.random_range(0..MAP_TILES))
    }

    /// Living trooper standing on `grid`, other than `shooter`.
    fn occupant(&self, grid: GridNo, shooter: SoldierId) -> Option<SoldierRef> {
        self.troopers
            .iter()
            .find(|(id, trooper)| **id != shooter && trooper.grid == grid)
            .and_then(|(id, _)| self.roster.current(*id))
    }
}

impl SoldierRegistry for DemoWorld {
    fn lookup(&self, id: SoldierId) -> Option<SoldierHandle> {
        self.roster.lookup(id)
    }
}

impl GameplayHandlers for DemoWorld {
    fn get_new_path(&mut self, soldier: SoldierHandle, event: &GetNewPath, sink: &mut EventSink) {
        let Some(trooper) = self.troopers.get_mut(&soldier.id) else {
            return;
        };
        let from = trooper.grid;
        trooper.grid = event.dest;
        trooper.anim = event.movement_anim;
        trooper.facing = direction_between(from, event.dest);
        debug!(soldier = %event.soldier, %from, to = %event.dest, "Trooper moved");

        emit(
            sink,
            GameEvent::Noise(Noise {
                maker: Some(event.soldier),
                grid: event.dest,
                level: 0,
                volume: FOOTSTEP_VOLUME,
                kind: NoiseKind::Movement,
            }),
            EventDelay::Ticks(1),
        );
    }

    fn set_desired_direction(
        &mut self,
        soldier: SoldierHandle,
        event: &SetDesiredDirection,
        _sink: &mut EventSink,
    ) {
        if let Some(trooper) = self.troopers.get_mut(&soldier.id) {
            trooper.facing = event.direction;
            debug!(soldier = %event.soldier, direction = ?event.direction, "Trooper turned");
        }
    }

    fn begin_fire_weapon(
        &mut self,
        soldier: SoldierHandle,
        event: &BeginFireWeapon,
        sink: &mut EventSink,
    ) {
        let Some(trooper) = self.troopers.get_mut(&soldier.id) else {
            return;
        };
        trooper.target = Some(event.target);
        trooper.facing = direction_between(trooper.grid, event.target.grid);
        debug!(soldier = %event.soldier, target = %event.target.grid, "Trooper raising weapon");

        emit(
            sink,
            GameEvent::FireWeapon(FireWeapon {
                soldier: event.soldier,
                target: event.target,
            }),
            EventDelay::Ticks(1),
        );
    }

    fn fire_weapon(&mut self, soldier: SoldierHandle, event: &FireWeapon, sink: &mut EventSink) {
        let Some(trooper) = self.troopers.get_mut(&soldier.id) else {
            return;
        };
        trooper.target = Some(event.target);
        let origin = trooper.grid;

        emit(
            sink,
            GameEvent::Noise(Noise {
                maker: Some(event.soldier),
                grid: origin,
                level: 0,
                volume: GUNFIRE_VOLUME,
                kind: NoiseKind::Gunfire,
            }),
            EventDelay::IMMEDIATE,
        );

        let Some(victim) = self.occupant(event.target.grid, soldier.id) else {
            debug!(soldier = %event.soldier, target = %event.target.grid, "Shot hit empty ground");
            return;
        };
        let roll = self.rng.random_range(0..100_u32);
        if roll >= self.hit_percent {
            info!(shooter = %event.soldier, %victim, roll, "Shot missed");
            return;
        }

        let damage = self.rng.random_range(15..=45_i16);
        let breath_loss = self.rng.random_range(5..=20_i16);
        emit(
            sink,
            GameEvent::WeaponHit(WeaponHit {
                victim: victim.id,
                attacker: soldier.id,
                weapon: WeaponIndex(0),
                damage,
                breath_loss,
                direction: direction_between(origin, event.target.grid),
                position: WorldPos::default(),
                range: i16::try_from(tile_distance(origin, event.target.grid)).unwrap_or(i16::MAX),
                special: 0,
                location: HitLocation::Random,
            }),
            EventDelay::IMMEDIATE,
        );
    }

    fn weapon_hit(
        &mut self,
        victim: SoldierHandle,
        attacker: SoldierHandle,
        event: &WeaponHit,
        sink: &mut EventSink,
    ) {
        let Some(trooper) = self.troopers.get_mut(&victim.id) else {
            return;
        };
        trooper.hp = trooper.hp.saturating_sub(event.damage);
        trooper.breath = trooper.breath.saturating_sub(event.breath_loss);
        let (hp, grid) = (trooper.hp, trooper.grid);
        info!(
            victim = %victim.id,
            attacker = %attacker.id,
            damage = event.damage,
            hp,
            "Trooper hit"
        );

        emit(
            sink,
            GameEvent::Noise(Noise {
                maker: Some(SoldierRef {
                    id: victim.id,
                    token: victim.generation_token,
                }),
                grid,
                level: 0,
                volume: SCREAM_VOLUME,
                kind: NoiseKind::Scream,
            }),
            EventDelay::IMMEDIATE,
        );

        if hp <= 0 {
            self.troopers.remove(&victim.id);
            match self.roster.kill(victim.id) {
                Ok(fallen) => info!(soldier = %fallen, killer = %attacker.id, "Trooper killed"),
                Err(err) => warn!(%err, "Killed trooper was not on the roster"),
            }
        }
    }

    fn noise(&mut self, source: Option<SoldierHandle>, event: &Noise, _sink: &mut EventSink) {
        let maker = source.map(|handle| handle.id);
        let listeners = self
            .troopers
            .iter()
            .filter(|(id, trooper)| {
                Some(**id) != maker && tile_distance(trooper.grid, event.grid) <= u16::from(event.volume)
            })
            .count();
        self.noises_heard = self
            .noises_heard
            .saturating_add(u64::try_from(listeners).unwrap_or(u64::MAX));
        debug!(kind = ?event.kind, grid = %event.grid, listeners, "Noise propagated");
    }
}

/// Queue a follow-up event, logging if the sink cannot take it.
fn emit(sink: &mut EventSink, event: GameEvent, delay: EventDelay) {
    if let Err(err) = sink.enqueue_event(event, delay) {
        warn!(kind = %event.kind(), %err, "Follow-up event lost");
    }
}

/// Column and row of a tile.
fn coords(grid: GridNo) -> (i16, i16) {
    let col = grid.0.checked_rem(MAP_COLS).unwrap_or(0);
    let row = grid.0.checked_div(MAP_COLS).unwrap_or(0);
    (col, row)
}

/// Compass direction from one tile towards another. Same tile faces north.
pub fn direction_between(from: GridNo, to: GridNo) -> Direction {
    let (from_col, from_row) = coords(from);
    let (to_col, to_row) = coords(to);
    match (
        to_col.saturating_sub(from_col).signum(),
        to_row.saturating_sub(from_row).signum(),
    ) {
        (1, -1) => Direction::NorthEast,
        (1, 0) => Direction::East,
        (1, 1) => Direction::SouthEast,
        (0, 1) => Direction::South,
        (-1, 1) => Direction::SouthWest,
        (-1, 0) => Direction::West,
        (-1, -1) => Direction::NorthWest,
        _ => Direction::North,
    }
}

/// Chebyshev distance between two tiles.
pub fn tile_distance(a: GridNo, b: GridNo) -> u16 {
    let (a_col, a_row) = coords(a);
    let (b_col, b_row) = coords(b);
    a_col.abs_diff(b_col).max(a_row.abs_diff(b_row))
}
