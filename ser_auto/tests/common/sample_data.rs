// Layout loosely follows the "minecraft_savedata" data set from
// https://github.com/djkoloski/rust_serialization_benchmark,
// reworked to use bases and shared references.

use std::{collections::BTreeMap, ops, rc::Rc};

use rand::Rng;
use rand_pcg::Lcg64Xsh32;
use ser_auto::Reflect;

pub trait Generate {
	fn generate<R: Rng>(rng: &mut R) -> Self;
}

#[derive(Reflect, Clone, Debug, Default, PartialEq)]
pub struct Item {
	pub count: i8,
	pub slot: u8,
	pub id: String,
}

impl Generate for Item {
	fn generate<R: Rng>(rng: &mut R) -> Self {
		const IDS: [&str; 8] = [
			"dirt",
			"stone",
			"pickaxe",
			"sand",
			"gravel",
			"shovel",
			"chestplate",
			"steak",
		];
		Self {
			count: rng.gen(),
			slot: rng.gen(),
			id: IDS[rng.gen_range(0..IDS.len())].to_string(),
		}
	}
}

#[derive(Reflect, Clone, Debug, Default, PartialEq)]
pub struct Abilities {
	pub walk_speed: f32,
	pub fly_speed: f32,
	pub may_fly: bool,
	pub flying: bool,
	pub invulnerable: bool,
}

impl Generate for Abilities {
	fn generate<R: Rng>(rng: &mut R) -> Self {
		Self {
			walk_speed: rng.gen(),
			fly_speed: rng.gen(),
			may_fly: rng.gen_bool(0.5),
			flying: rng.gen_bool(0.5),
			invulnerable: rng.gen_bool(0.5),
		}
	}
}

/// Fields common to everything in the world.
#[derive(Reflect, Clone, Debug, Default, PartialEq)]
pub struct Entity {
	pub id: u64,
	pub pos: (f64, f64, f64),
	pub motion: [f64; 3],
	pub rotation: (f32, f32),
	pub air: i16,
	pub on_ground: bool,
}

impl Generate for Entity {
	fn generate<R: Rng>(rng: &mut R) -> Self {
		Self {
			id: rng.gen(),
			pos: (rng.gen(), rng.gen(), rng.gen()),
			motion: [rng.gen(), rng.gen(), rng.gen()],
			rotation: (rng.gen(), rng.gen()),
			air: rng.gen(),
			on_ground: rng.gen_bool(0.5),
		}
	}
}

#[derive(Reflect, Clone, Debug, Default, PartialEq)]
pub struct Player {
	#[ser_base]
	pub entity: Entity,
	pub name: String,
	pub game_type: u8,
	pub score: i32,
	pub abilities: Abilities,
	pub inventory: Vec<Item>,
	pub ender_items: Option<Vec<Item>>,
	pub recipes: BTreeMap<String, u32>,
	// Players on the same team share one `Team`
	pub team: Rc<Team>,
}

impl Generate for Player {
	fn generate<R: Rng>(rng: &mut R) -> Self {
		const NAMES: [&str; 8] = [
			"Alex",
			"Steve",
			"Herobrine",
			"Notch",
			"Jeb",
			"Dinnerbone",
			"Grumm",
			"Ünïcødé 🦀",
		];
		Self {
			entity: Entity::generate(rng),
			name: NAMES[rng.gen_range(0..NAMES.len())].to_string(),
			game_type: rng.gen_range(0..4),
			score: rng.gen(),
			abilities: Abilities::generate(rng),
			inventory: generate_vec(rng, 0..10),
			ender_items: if rng.gen_bool(0.5) {
				Some(generate_vec(rng, 0..5))
			} else {
				None
			},
			recipes: (0..rng.gen_range(0..5))
				.map(|i| (format!("recipe_{i}"), rng.gen()))
				.collect(),
			team: Rc::default(),
		}
	}
}

#[derive(Reflect, Clone, Debug, Default, PartialEq)]
pub struct Team {
	pub name: String,
	pub color: char,
}

#[derive(Reflect, Debug, Default, PartialEq)]
pub struct World {
	pub teams: Vec<Rc<Team>>,
	pub players: Vec<Player>,
}

pub fn generate_vec<R: Rng, T: Generate>(rng: &mut R, range: ops::Range<usize>) -> Vec<T> {
	let len = rng.gen_range(range);
	(0..len).map(|_| T::generate(rng)).collect()
}

pub fn generate_data() -> World {
	const STATE: u64 = 3141592653;
	const STREAM: u64 = 5897932384;
	const PLAYERS: usize = 50;

	let mut rng = Lcg64Xsh32::new(STATE, STREAM);

	let teams: Vec<Rc<Team>> = ["red", "blue", "green"]
		.iter()
		.zip(['r', 'b', 'g'])
		.map(|(name, color)| {
			Rc::new(Team {
				name: name.to_string(),
				color,
			})
		})
		.collect();

	let players = (0..PLAYERS)
		.map(|_| {
			let mut player = Player::generate(&mut rng);
			player.team = teams[rng.gen_range(0..teams.len())].clone();
			player
		})
		.collect();

	World { teams, players }
}
