use std::{io::Read, ptr};

use log::LevelFilter;
use segalloc::{Heap, HeapConfig, Pointer, Sbrk, program_break};

/// Waits until the user presses ENTER, only when running with `--step`.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed(step: bool) {
  if !step {
    return;
  }

  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    program_break(),
  );
}

fn print_alloc(
  size: usize,
  address: Pointer<u8>,
) {
  println!(
    "Allocated {} bytes, address = {:?}, program break = {:?}",
    size,
    address,
    program_break()
  );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  simple_logger::SimpleLogger::new()
    .with_level(LevelFilter::Debug)
    .init()?;

  let step = std::env::args().any(|arg| arg == "--step");

  print_program_break("start");

  // Our heap grows the data segment with sbrk. Every growth must continue
  // right where the previous one ended; if anything else moves the break in
  // between, the growth is refused instead of corrupting the heap.
  let sbrk = unsafe { Sbrk::new()? };
  let mut heap: Heap<Sbrk> = Heap::init(sbrk, HeapConfig::default())?;

  print_program_break("after init");
  heap.check(true);
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 1) Allocate space for a u32. Rounded up to the 32 byte minimum block.
  // --------------------------------------------------------------------
  let first_block = heap.allocate(4);
  println!("\n[1] Allocate u32");
  print_alloc(4, first_block);

  if let Some(first_ptr) = first_block {
    let first_ptr = first_ptr.cast::<u32>();
    unsafe {
      first_ptr.write(0xDEADBEEF);
      println!("[1] Value written to first_block = 0x{:X}", first_ptr.read());
      println!("[1] Usable size = {} bytes", heap.usable_size(first_ptr.cast()));
    }
  }

  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 2) Allocate 40 bytes twice. The second block follows the first one.
  // --------------------------------------------------------------------
  let second_block = heap.allocate(40);
  let third_block = heap.allocate(40);
  println!("\n[2] Allocate [u8; 40] twice");
  print_alloc(40, second_block);
  print_alloc(40, third_block);

  if let Some(second_ptr) = second_block {
    unsafe { ptr::write_bytes(second_ptr.as_ptr(), 0xAB, 40) };
    println!("[2] Initialized second block with 0xAB");
  }

  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 3) Release the second block and allocate the same size again. The
  //    freed block is the first one found in its size class.
  // --------------------------------------------------------------------
  unsafe { heap.release(second_block) };
  let fourth_block = heap.allocate(40);
  println!("\n[3] Release second block, allocate [u8; 40] again");
  print_alloc(40, fourth_block);
  println!(
    "[3] fourth_block == second_block? {}",
    if fourth_block == second_block {
      "Yes, it reused the freed block"
    } else {
      "No, it allocated somewhere else"
    }
  );

  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 4) Release neighbours. They are merged into one free block at once.
  // --------------------------------------------------------------------
  unsafe {
    heap.release(fourth_block);
    heap.release(third_block);
  }
  println!("\n[4] Released two neighbouring blocks");
  heap.check(true);

  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 5) Allocate a large block to observe heap growth.
  // --------------------------------------------------------------------
  print_program_break("before large alloc");

  let big_block = heap.allocate(256 * 1024);
  println!("\n[5] Allocate large 256 KiB block");
  print_alloc(256 * 1024, big_block);

  print_program_break("after large alloc");
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 6) Grow the first allocation. The contents move to a new block.
  // --------------------------------------------------------------------
  let moved = unsafe { heap.reallocate(first_block, 64)? };
  println!("\n[6] Reallocate first block to 64 bytes");
  print_alloc(64, moved);

  if let Some(moved) = moved {
    println!(
      "[6] Value after the move = 0x{:X}",
      unsafe { moved.cast::<u32>().read() }
    );
  }

  let report = heap.check(false);
  println!("\n{:#?}", heap.stats());
  println!("Heap consistent: {}", report.is_ok());

  // --------------------------------------------------------------------
  // 7) End of demo. The region is never given back to the kernel, the OS
  //    reclaims it when the process exits.
  // --------------------------------------------------------------------
  println!("\n[7] End of example. Process will exit and the OS will reclaim all memory.");

  Ok(())
}
