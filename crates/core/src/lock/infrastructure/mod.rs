pub mod command_screen_locker;
