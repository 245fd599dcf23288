use crate::config::{Launcher, SweepConfig};
use crate::grid::GridPoint;
use std::ffi::OsString;
use std::fmt;

/// Full argv for one run: `[timer...] [mpirun -n <p>] <binary> <timestep> <nx> <ny> <px> <py>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    argv: Vec<OsString>,
}

impl Invocation {
    pub fn for_point(cfg: &SweepConfig, point: &GridPoint) -> Self {
        let mut argv: Vec<OsString> = cfg.timer.iter().map(OsString::from).collect();

        if let Launcher::Mpirun { program } = &cfg.launcher {
            argv.push(program.into());
            argv.push("-n".into());
            argv.push(point.workers().to_string().into());
        }

        argv.push(cfg.binary.clone().into_os_string());
        for v in [cfg.timestep, point.nx, point.ny, point.px, point.py] {
            argv.push(v.to_string().into());
        }

        Self { argv }
    }

    pub fn program(&self) -> &OsString {
        // argv always holds at least the binary and its five arguments
        &self.argv[0]
    }

    pub fn args(&self) -> &[OsString] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.argv.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", a.to_string_lossy())?;
        }
        Ok(())
    }
}
