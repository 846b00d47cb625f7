// SPDX-License-Identifier: MIT

use sfatfs::prelude::*;

fn mounted<'a>(buf: &'a mut [u8], config: &SfatConfig) -> SfatFs<MemVolumeIO<'a>> {
    let mut fs = SfatFs::new(MemVolumeIO::new(buf), config).unwrap();
    fs.mount().unwrap();
    fs
}

#[test]
fn test_file_table_full_when_table_is_capped() {
    let config = SfatConfig::new(2000, 10);
    let mut buf = vec![0u8; 2000];
    let mut fs = mounted(&mut buf, &config);

    let mut fh = fs.create("a").unwrap();
    fs.write(&mut fh, &[1u8; 63]).unwrap();
    assert_eq!(fh.size(), 7);

    let before = fs.inspect(0..200).unwrap();
    let err = fs.append(&mut fh, &[1u8]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileTableFull);
    assert_eq!(fs.inspect(0..200).unwrap(), before);

    assert_eq!(fs.create("b").unwrap_err().kind(), ErrorKind::FileTableFull);
    assert!(fs.check().unwrap().ok());
}

#[test]
fn test_disc_full_when_data_clusters_run_out() {
    let mut buf = vec![0u8; 3000];
    let mut fs = mounted(&mut buf, &SfatConfig::default());

    for name in (b'A'..).take(27) {
        fs.create(&(name as char).to_string()).unwrap();
    }
    let err = fs.create("z").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DiscFull);
    assert_eq!(fs.list().unwrap().len(), 27);
    assert_eq!(fs.stats().unwrap().free_clusters, 0);
}

#[test]
fn test_disc_full_when_directory_runs_out() {
    let config = SfatConfig::new(3000, 30);
    let mut buf = vec![0u8; 3000];
    let mut fs = mounted(&mut buf, &config);
    assert_eq!(fs.meta().dir_capacity, 10);

    for name in (b'a'..).take(10) {
        fs.create(&(name as char).to_string()).unwrap();
    }
    let err = fs.create("Z").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DiscFull);
    assert_eq!(fs.stats().unwrap().used_clusters, 10);
}

#[test]
fn test_failed_write_keeps_handle_and_volume() {
    let mut buf = vec![0u8; 3000];
    let mut fs = mounted(&mut buf, &SfatConfig::default());

    let mut a = fs.create("a").unwrap();
    fs.write(&mut a, &[b'a'; 50]).unwrap();
    let mut big = fs.create("b").unwrap();
    assert!(fs.write(&mut big, &[b'b'; 5000]).is_err());

    assert_eq!(big.size(), 1);
    assert_eq!(big.state(), HandleState::Open);
    fs.write(&mut big, &[b'b'; 20]).unwrap();
    assert_eq!(fs.read_to_end(&big).unwrap(), vec![b'b'; 20]);
    assert_eq!(fs.read_to_end(&a).unwrap(), vec![b'a'; 50]);
    assert!(fs.check().unwrap().ok());
}
