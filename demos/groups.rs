use std::io::Read;

use chunkalloc::{Allocator, Config, SearchMode};
use libc::sbrk;
use tracing_subscriber::EnvFilter;

/// Waits for ENTER when the demo runs with `--pause`, so the heap can be
/// inspected with `pmap` or `gdb` between steps.
fn pause(enabled: bool) {
  if enabled {
    println!("\n>>> Press ENTER to continue...");
    let _ = std::io::stdin().bytes().next();
  }
}

/// Prints the current program break using `sbrk(0)`.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .with_target(false)
    .init();

  let paused = std::env::args().any(|arg| arg == "--pause");

  print_program_break("start");
  pause(paused);

  // --------------------------------------------------------------------
  // 1) Eight byte chunks holding four byte integers, oldest chunk first.
  // --------------------------------------------------------------------
  let config = Config::new(8).with_search_mode(SearchMode::OldestFirst);
  let Ok(ints) = Allocator::<i32>::with_config(config) else {
    eprintln!("invalid configuration");
    return;
  };

  let Some(p) = ints.allocate(1) else { return };
  unsafe { ints.construct(p, 1221) };
  println!("\n[1] allocate(1) -> {p:?}, chunks = {}", ints.chunk_count());

  let Some(p1) = ints.allocate(2) else { return };
  unsafe {
    ints.construct(p1, -14521);
    ints.construct(p1.add(1), 454);
  }
  println!("[1] allocate(2) -> {p1:?}, chunks = {}", ints.chunk_count());

  let p2 = ints.allocate(1);
  println!("[1] allocate(1) -> {p2:?} (back in the first chunk)");

  let p3 = ints.allocate(1);
  println!("[1] allocate(1) -> {p3:?}, chunks = {}", ints.chunk_count());

  println!("[1] allocate(3) -> {:?}", ints.try_allocate(3));
  pause(paused);

  // --------------------------------------------------------------------
  // 2) A copy shares the chain. Both handles grow the same group.
  // --------------------------------------------------------------------
  let copy = ints.clone();
  ints.allocate(2);
  copy.allocate(1);
  println!("\n[2] {:?}", copy.stats());

  unsafe {
    println!("[2] values = {}, {}, {}", p.read(), p1.read(), p1.add(1).read());
  }
  pause(paused);

  // --------------------------------------------------------------------
  // 3) Dropping one member keeps the chain; dropping the last releases it.
  // --------------------------------------------------------------------
  let watch = ints.downgrade();
  drop(ints);
  println!("\n[3] after first drop: members = {}", watch.member_count());
  drop(copy);
  println!("[3] after last drop: torn down = {}", watch.is_torn_down());

  print_program_break("end");
}
