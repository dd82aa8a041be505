//! Stub executables for tests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script
pub fn write_script(path: &Path, body: &str) -> PathBuf {
    fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

/// Stand-in for the airtest runner.
///
/// `run` appends the device to `launched.txt` and writes `log.txt` unless the
/// device name starts with `NOLOG`. Devices starting with `FAIL` exit 3, devices
/// starting with `SLOW` sleep first. `report` writes the outfile and exits 0.
pub fn write_stub_runner(dir: &Path) -> PathBuf {
    write_script(
        &dir.join("airtest-stub"),
        r#"case "$1" in
  run)
    dev="${4#Android:///}"
    logdir="$6"
    echo "$dev" >> launched.txt
    case "$dev" in SLOW*) sleep 1 ;; esac
    case "$dev" in NOLOG*) ;; *) echo "ran $2" > "$logdir/log.txt" ;; esac
    case "$dev" in FAIL*) exit 3 ;; esac
    exit 0
    ;;
  report)
    echo "<html>$8</html>" > "$6"
    exit 0
    ;;
esac
exit 64
"#,
    )
}

/// Devices recorded by the stub runner, in launch-log order
pub fn launched_devices(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("launched.txt"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
