use anyhow::Result;
use log::info;

use std::env;

use bufmgr::buffer::{entity::PinContents, manager::BufferPoolManager};
use bufmgr::config::BufferPoolConfig;
use bufmgr::disk::file::DiskManager;
use bufmgr::pool::clocksweep::ClockSweepManager;
use bufmgr::storage::entity::PAGE_SIZE;

fn main() -> Result<()> {
    env_logger::init();

    // config
    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => BufferPoolConfig::load(path)?,
        None => BufferPoolConfig::default(),
    };
    let heap_file_path = args.next().unwrap_or_else(|| "sample-db.rly".to_string());
    info!("open {} with {:?}", heap_file_path, config);

    let disk = DiskManager::open(&heap_file_path)?;
    let mut bufmgr = ClockSweepManager::with_config(disk, &config)?;

    // プールより多いページを書いて追い出しを起こす
    let names = [
        "Alice", "Bob", "Charlie", "Dave", "Eve", "Frank", "Grace", "Heidi", "Ivan", "Judy",
        "Mallory", "Oscar",
    ];
    let mut page_ids = vec![];
    for name in names.iter() {
        let mut page = [0u8; PAGE_SIZE];
        page[..name.len()].copy_from_slice(name.as_bytes());
        let handle = bufmgr.new_page(&page, 1)?;
        bufmgr.unpin_page(handle.page_id(), true)?;
        page_ids.push(handle.page_id());
    }
    bufmgr.flush_all()?;

    for &page_id in page_ids.iter().rev() {
        let handle = bufmgr.pin_page(page_id, PinContents::DiskIo)?;
        let page = bufmgr.page(&handle)?;
        let len = page.iter().position(|&b| b == 0).unwrap_or(PAGE_SIZE);
        println!("{:?}: {}", page_id, String::from_utf8_lossy(&page[..len]));
        bufmgr.unpin_page(page_id, false)?;
    }
    println!(
        "{} frames, {} unpinned, {} resident",
        bufmgr.pool_size(),
        bufmgr.unpinned_count(),
        bufmgr.resident_count()
    );
    Ok(())
}
