use super::*;

const SMALL: RegionKind = RegionKind::Pattern { seed: 1, width: 2, height: 2 };

#[test]
fn region_byte_len_is_four_bytes_per_pixel() {
    let r = PixelRegion { offset: 8, width: 3, height: 5, epoch: 0 };
    assert_eq!(r.byte_len(), 60);
    assert_eq!(r.end(), 68);
    assert!(r.fits(68));
    assert!(!r.fits(67));
}

#[test]
fn region_fits_rejects_overflowing_offset() {
    let r = PixelRegion { offset: usize::MAX, width: 1, height: 1, epoch: 0 };
    assert!(!r.fits(usize::MAX));
}

#[test]
fn allocation_is_zeroed_and_recorded() {
    let mut mem = Memory::new(1024);
    let (region, bytes) = mem.allocate(RegionKind::Frame, 2, 3);
    assert_eq!(bytes.len(), 24);
    assert!(bytes.iter().all(|b| *b == 0));
    assert_eq!(mem.lookup(&RegionKind::Frame), Some(region));
    assert!(mem.slice(&region).is_some());
}

#[test]
fn allocations_are_aligned_and_do_not_overlap() {
    let mut mem = Memory::new(1024);
    let (a, _) = mem.allocate(RegionKind::Pattern { seed: 0, width: 1, height: 1 }, 1, 1);
    let (b, _) = mem.allocate(SMALL, 2, 2);
    assert_eq!(a.offset, 0);
    assert_eq!(b.offset % REGION_ALIGN, 0);
    assert!(b.offset >= a.end());
    assert_eq!(a.epoch, b.epoch);
}

#[test]
fn release_all_advances_epoch_and_stales_regions() {
    let mut mem = Memory::new(1024);
    let (old, _) = mem.allocate(SMALL, 2, 2);
    mem.release_all();

    assert_eq!(mem.epoch(), old.epoch + 1);
    assert!(mem.lookup(&SMALL).is_none());
    assert!(mem.slice(&old).is_none());

    let (new, _) = mem.allocate(SMALL, 2, 2);
    assert_ne!(new.offset, old.offset);
}

#[test]
fn crossing_budget_compacts_to_offset_zero() {
    let mut mem = Memory::new(40);
    let (first, _) = mem.allocate(SMALL, 2, 2);
    mem.release_all();
    let (second, _) = mem.allocate(SMALL, 2, 2);
    mem.release_all();
    let (third, _) = mem.allocate(SMALL, 2, 2);

    assert_eq!(first.offset, 0);
    assert_eq!(second.offset, 16);
    assert_eq!(third.offset, 0);
    assert!(third.epoch > second.epoch + 1);
    assert_eq!(mem.len(), 16);
}

#[test]
fn oversized_first_allocation_still_succeeds() {
    let mut mem = Memory::new(4);
    let (region, bytes) = mem.allocate(RegionKind::Frame, 4, 4);
    assert_eq!(region.offset, 0);
    assert_eq!(bytes.len(), 64);
}
