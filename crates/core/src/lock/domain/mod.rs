pub mod screen_locker;
