use std::fmt;

use crate::aggregate::GlobalStats;

impl fmt::Display for GlobalStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Benchmark statistics (all times are in seconds):")?;
        writeln!(f, "Total # of queries:           {:>10}", self.total_queries)?;
        writeln!(f, "Total queries execution time: {:>10.5}", self.total_time)?;
        writeln!(f, "Minimum       execution time: {:>10.5}", self.min_time)?;
        writeln!(f, "Maximum       execution time: {:>10.5}", self.max_time)?;
        writeln!(f, "Average       execution time: {:>10.5}", self.average_time)?;
        writeln!(f, "Median        execution time: {:>10.5}", self.median_time)
    }
}
