use crate::error::{DriftError, Result};
use crate::target::{self, ReconciliationTarget};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Declarative table of reconciliation targets, loaded from YAML. One manifest
/// replaces the pile of copy-pasted one-off scripts it grew out of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub targets: Vec<ReconciliationTarget>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Manifest> {
        if !path.exists() {
            return Err(DriftError::ManifestNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_yaml::from_str(&text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Structural checks that need no network: names are valid and unique,
    /// every dependency edge points at a declared target, no cycles.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for t in &self.targets {
            target::validate_name(&t.name)?;
            if !seen.insert(t.name.as_str()) {
                return Err(DriftError::DuplicateTarget(t.name.clone()));
            }
        }
        for t in &self.targets {
            for dep in &t.depends_on {
                if !seen.contains(dep.as_str()) {
                    return Err(DriftError::UnknownDependency {
                        target: t.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        self.execution_order()?;
        Ok(())
    }

    pub fn find(&self, name: &str) -> Result<&ReconciliationTarget> {
        self.targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| DriftError::TargetNotFound(name.to_string()))
    }

    /// Dependency order (leaves first) via Kahn's algorithm, with manifest
    /// order as the deterministic tie-break. A cycle fails the whole run
    /// before any network call is made.
    pub fn execution_order(&self) -> Result<Vec<&ReconciliationTarget>> {
        let index: HashMap<&str, usize> = self
            .targets
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();

        let mut in_degree = vec![0usize; self.targets.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.targets.len()];
        for (i, t) in self.targets.iter().enumerate() {
            for dep in &t.depends_on {
                let Some(&d) = index.get(dep.as_str()) else {
                    return Err(DriftError::UnknownDependency {
                        target: t.name.clone(),
                        dependency: dep.clone(),
                    });
                };
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }

        let mut order = Vec::with_capacity(self.targets.len());
        let mut ready: Vec<usize> = (0..self.targets.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();

        while let Some(&i) = ready.first() {
            ready.remove(0);
            order.push(i);
            for &j in &dependents[i] {
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    // Insert keeping manifest order so runs are deterministic.
                    let pos = ready.partition_point(|&k| k < j);
                    ready.insert(pos, j);
                }
            }
        }

        if order.len() != self.targets.len() {
            let stuck: Vec<&str> = self
                .targets
                .iter()
                .enumerate()
                .filter(|(i, _)| !order.contains(i))
                .map(|(_, t)| t.name.as_str())
                .collect();
            return Err(DriftError::DependencyCycle(stuck.join(", ")));
        }

        Ok(order.into_iter().map(|i| &self.targets[i]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
targets:
  - name: student-exams-table
    description: exam registrations table is queryable
    probe:
      kind: table
      table: student_exams
    action:
      kind: manual
    fallback: |
      CREATE TABLE student_exams (id BIGINT PRIMARY KEY, student_id BIGINT, exam_id BIGINT);
  - name: add-has-completed
    depends_on: [student-exams-table]
    probe:
      kind: column
      table: active_students
      column: has_completed
    action:
      kind: scaffold_row
      table: active_students
      key_column: id
      row:
        has_completed: false
    fallback: |
      ALTER TABLE active_students ADD COLUMN IF NOT EXISTS has_completed BOOLEAN DEFAULT FALSE;
"#;

    fn write_manifest(text: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(text.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_and_validates_sample() {
        let f = write_manifest(SAMPLE);
        let m = Manifest::load(f.path()).unwrap();
        assert_eq!(m.targets.len(), 2);
        assert_eq!(m.find("add-has-completed").unwrap().depends_on.len(), 1);
        assert!(m.find("nope").is_err());
    }

    #[test]
    fn missing_file_is_a_typed_error() {
        let err = Manifest::load(Path::new("/nonexistent/drift.yaml")).unwrap_err();
        assert!(matches!(err, DriftError::ManifestNotFound(_)));
    }

    fn bare(name: &str, deps: &[&str]) -> ReconciliationTarget {
        ReconciliationTarget {
            name: name.into(),
            description: None,
            depends_on: deps.iter().map(|s| s.to_string()).collect(),
            probe: crate::target::ProbeSpec::Table {
                table: name.replace('-', "_"),
            },
            action: crate::target::ActionSpec::Manual,
            fallback: format!("CREATE TABLE {};", name.replace('-', "_")),
        }
    }

    #[test]
    fn execution_order_is_leaves_first() {
        let m = Manifest {
            targets: vec![bare("c", &["b"]), bare("a", &[]), bare("b", &["a"])],
        };
        let order: Vec<&str> = m
            .execution_order()
            .unwrap()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn independent_targets_keep_manifest_order() {
        let m = Manifest {
            targets: vec![bare("z", &[]), bare("a", &[]), bare("m", &[])],
        };
        let order: Vec<&str> = m
            .execution_order()
            .unwrap()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(order, vec!["z", "a", "m"]);
    }

    #[test]
    fn cycle_fails_validation() {
        let m = Manifest {
            targets: vec![bare("a", &["b"]), bare("b", &["a"]), bare("c", &[])],
        };
        let err = m.validate().unwrap_err();
        match err {
            DriftError::DependencyCycle(names) => {
                assert!(names.contains('a') && names.contains('b'));
                assert!(!names.contains('c'));
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn unknown_dependency_rejected() {
        let m = Manifest {
            targets: vec![bare("a", &["ghost"])],
        };
        assert!(matches!(
            m.validate().unwrap_err(),
            DriftError::UnknownDependency { .. }
        ));
    }

    #[test]
    fn duplicate_names_rejected() {
        let m = Manifest {
            targets: vec![bare("a", &[]), bare("a", &[])],
        };
        assert!(matches!(
            m.validate().unwrap_err(),
            DriftError::DuplicateTarget(_)
        ));
    }
}
