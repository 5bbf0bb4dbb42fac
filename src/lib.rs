pub mod game_logic;
pub mod powerup_plugin;
pub mod settings;
