// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bridge assembly: schedules every member, realizes its solids and writes the
//! output document.
//!
//! Members are built in two phases. Panels, sub-panels and cross members run
//! first and publish their member axes; gussets run second against those axes.
//! Within a phase jobs run on the rayon pool and their results are attached to
//! the document by the calling thread, in job order.

use crate::alignment::Alignment;
use crate::config::{FailurePolicy, KernelConfig};
use crate::context::BuildContext;
use crate::engine::{
    build_cross_beam, build_deck, build_diagonal_bracing, build_gusset, build_lateral_bracing,
    build_main_panel, build_sub_panel, CrossMemberOutput, ElementRecipe, MemberAxis,
};
use crate::error::{KernelError, KernelResult};
use crate::solid::{Document, ElementClass, SolidBackend};
use crate::spec::{
    BridgeSpec, CrossBeam, Deck, DiagonalBracing, GussetSpec, LateralBracing, MainPanel, SubPanel,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;
use tracing::{error, info, warn};

/// Kind of input record a member comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    MainPanel,
    Deck,
    SubPanel,
    CrossBeam,
    DiagonalBracing,
    LateralBracing,
    Gusset,
}

impl MemberKind {
    pub fn label(self) -> &'static str {
        match self {
            MemberKind::MainPanel => "MainPanel",
            MemberKind::Deck => "Shouban",
            MemberKind::SubPanel => "SubPanel",
            MemberKind::CrossBeam => "Yokogeta",
            MemberKind::DiagonalBracing => "Taikeikou",
            MemberKind::LateralBracing => "Yokokou",
            MemberKind::Gusset => "Gusset",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One element attached to the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltElement {
    pub name: String,
    pub class: ElementClass,
    pub container: Option<String>,
    /// Cubic millimetres
    pub volume: f64,
}

/// A member that produced no elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFailure {
    pub kind: MemberKind,
    pub member: String,
    pub error: String,
}

/// Outcome of a document build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub bridge: String,
    pub built: Vec<BuiltElement>,
    pub failures: Vec<MemberFailure>,
    pub elapsed_ms: u64,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total_volume(&self) -> f64 {
        self.built.iter().map(|e| e.volume).sum()
    }

    pub fn failure(&self, member: &str) -> Option<&MemberFailure> {
        self.failures.iter().find(|f| f.member == member)
    }
}

/// Member scheduled in the first phase
#[derive(Debug, Clone, Copy)]
enum MemberJob<'a> {
    MainPanel(&'a MainPanel),
    Deck(&'a Deck),
    SubPanel(&'a SubPanel),
    CrossBeam(&'a CrossBeam),
    DiagonalBracing(&'a DiagonalBracing),
    LateralBracing(&'a LateralBracing),
}

impl MemberJob<'_> {
    fn kind(&self) -> MemberKind {
        match self {
            MemberJob::MainPanel(_) => MemberKind::MainPanel,
            MemberJob::Deck(_) => MemberKind::Deck,
            MemberJob::SubPanel(_) => MemberKind::SubPanel,
            MemberJob::CrossBeam(_) => MemberKind::CrossBeam,
            MemberJob::DiagonalBracing(_) => MemberKind::DiagonalBracing,
            MemberJob::LateralBracing(_) => MemberKind::LateralBracing,
        }
    }

    fn name(&self) -> String {
        match self {
            MemberJob::MainPanel(p) => p.name(),
            MemberJob::Deck(d) => d.name.clone(),
            MemberJob::SubPanel(s) => s.name.clone(),
            MemberJob::CrossBeam(c) => c.name(),
            MemberJob::DiagonalBracing(d) => d.name.clone(),
            MemberJob::LateralBracing(l) => l.name.clone(),
        }
    }

    fn recipes(
        &self,
        spec: &BridgeSpec,
        alignment: &Alignment,
        ctx: &BuildContext,
    ) -> KernelResult<CrossMemberOutput> {
        let plates = |elements: Vec<ElementRecipe>| CrossMemberOutput {
            elements,
            axes: Vec::new(),
        };
        match self {
            MemberJob::MainPanel(p) => {
                build_main_panel(p, alignment, &spec.catalog, ctx).map(plates)
            }
            MemberJob::Deck(d) => build_deck(d, alignment, &spec.catalog, ctx).map(plates),
            MemberJob::SubPanel(s) => build_sub_panel(s, spec, alignment, ctx).map(plates),
            MemberJob::CrossBeam(c) => build_cross_beam(c, spec, alignment, ctx),
            MemberJob::DiagonalBracing(d) => build_diagonal_bracing(d, spec, alignment, ctx),
            MemberJob::LateralBracing(l) => build_lateral_bracing(l, spec, alignment, ctx),
        }
    }
}

/// Elements of one member, realized by the backend
struct Realized<S> {
    elements: Vec<(ElementRecipe, S, f64)>,
    axes: Vec<MemberAxis>,
}

type JobResult<S> = (MemberKind, String, KernelResult<Realized<S>>);

/// Builds the output document of a validated bridge description
pub struct BridgeBuilder<'a, B: SolidBackend> {
    spec: &'a BridgeSpec,
    alignment: Alignment,
    ctx: BuildContext,
    backend: B,
}

impl<'a, B: SolidBackend> BridgeBuilder<'a, B> {
    pub fn new(spec: &'a BridgeSpec, config: &KernelConfig, backend: B) -> Self {
        let alignment = Alignment::new(&spec.lines);
        let axis = alignment.bridge_axis(&config.tolerance);
        let ctx = BuildContext::new(config, axis, spec.side_export);
        Self {
            spec,
            alignment,
            ctx,
            backend,
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    fn jobs(&self) -> Vec<MemberJob<'a>> {
        let spec = self.spec;
        let mut jobs = Vec::with_capacity(spec.member_count());
        jobs.extend(spec.main_panels.iter().map(MemberJob::MainPanel));
        jobs.extend(spec.decks.iter().map(MemberJob::Deck));
        jobs.extend(spec.sub_panels.iter().map(MemberJob::SubPanel));
        jobs.extend(spec.cross_beams.iter().map(MemberJob::CrossBeam));
        jobs.extend(spec.diagonal_bracings.iter().map(MemberJob::DiagonalBracing));
        jobs.extend(spec.lateral_bracings.iter().map(MemberJob::LateralBracing));
        jobs
    }

    fn realize(&self, output: CrossMemberOutput) -> KernelResult<Realized<B::Solid>> {
        let elements = output
            .elements
            .into_iter()
            .map(|recipe| {
                let solid = self.backend.realize(&recipe.name, &recipe.recipe)?;
                let volume = self.backend.volume(&solid);
                Ok((recipe, solid, volume))
            })
            .collect::<KernelResult<Vec<_>>>()?;
        Ok(Realized {
            elements,
            axes: output.axes,
        })
    }

    fn run_member(&self, job: &MemberJob<'_>) -> JobResult<B::Solid> {
        let (kind, name) = (job.kind(), job.name());
        let span = self.ctx.member_span(kind.label(), &name);
        let _guard = span.enter();
        let result = job
            .recipes(self.spec, &self.alignment, &self.ctx)
            .and_then(|output| self.realize(output));
        (kind, name, result)
    }

    fn run_gusset(
        &self,
        gusset: &GussetSpec,
        axes: &HashMap<String, MemberAxis>,
    ) -> JobResult<B::Solid> {
        let name = gusset.name();
        let span = self.ctx.member_span(MemberKind::Gusset.label(), &name);
        let _guard = span.enter();
        let result = axes
            .get(&gusset.member)
            .ok_or_else(|| KernelError::MissingMember(gusset.member.clone()))
            .and_then(|axis| {
                build_gusset(gusset, axis, self.spec, &self.alignment, &self.ctx)
            })
            .and_then(|out| {
                self.realize(CrossMemberOutput {
                    elements: vec![out.element],
                    axes: Vec::new(),
                })
            });
        (MemberKind::Gusset, name, result)
    }

    /// Maps `items` on the configured pool, keeping their order
    fn schedule<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        let options = &self.ctx.options;
        if !options.parallel {
            return Ok(items.iter().map(f).collect());
        }
        match options.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .with_context(|| format!("Failed to start a pool of {threads} workers"))?;
                Ok(pool.install(|| items.par_iter().map(&f).collect::<Vec<R>>()))
            }
            None => Ok(items.par_iter().map(f).collect::<Vec<R>>()),
        }
    }

    /// Attaches all of one member's results, or none of them and records its failure
    fn commit(
        &self,
        (kind, name, result): JobResult<B::Solid>,
        document: &mut Document<B::Solid>,
        report: &mut BuildReport,
        axes: &mut HashMap<String, MemberAxis>,
    ) -> Result<()> {
        let attached = result.and_then(|realized| {
            let mut fresh = HashSet::with_capacity(realized.elements.len());
            for (recipe, _, _) in &realized.elements {
                if document.contains(&recipe.name) || !fresh.insert(recipe.name.as_str()) {
                    return Err(KernelError::DuplicateName(recipe.name.clone()));
                }
            }
            for (recipe, solid, volume) in realized.elements {
                document.attach_named_element(
                    recipe.container.as_deref(),
                    solid,
                    &recipe.name,
                    recipe.class,
                )?;
                report.built.push(BuiltElement {
                    name: recipe.name,
                    class: recipe.class,
                    container: recipe.container,
                    volume,
                });
            }
            for axis in realized.axes {
                if axes.insert(axis.name.clone(), axis).is_some() {
                    warn!(member = %name, "member axis published twice");
                }
            }
            Ok(())
        });

        match attached {
            Ok(()) => Ok(()),
            Err(err) => match self.ctx.failure_policy() {
                FailurePolicy::AbortOnFirst => {
                    Err(anyhow::Error::new(err).context(format!("{kind} `{name}` failed")))
                }
                FailurePolicy::BestEffort => {
                    error!(kind = %kind, member = %name, error = %err, "member failed");
                    report.failures.push(MemberFailure {
                        kind,
                        member: name,
                        error: err.to_string(),
                    });
                    Ok(())
                }
            },
        }
    }

    /// Builds every member into a new document
    pub fn build(&self) -> Result<(Document<B::Solid>, BuildReport)> {
        let started = Instant::now();
        let mut document = Document::new(self.spec.name.clone());
        let mut report = BuildReport {
            bridge: self.spec.name.clone(),
            ..Default::default()
        };
        let mut axes = HashMap::new();

        let jobs = self.jobs();
        info!(members = jobs.len(), parallel = self.ctx.options.parallel, "building members");
        for result in self.schedule(jobs.as_slice(), |job| self.run_member(job))? {
            self.commit(result, &mut document, &mut report, &mut axes)?;
        }

        let gussets = &self.spec.gussets;
        if !gussets.is_empty() {
            info!(gussets = gussets.len(), axes = axes.len(), "building gussets");
            let published = &axes;
            let results = self.schedule(gussets.as_slice(), |g| self.run_gusset(g, published))?;
            for result in results {
                self.commit(result, &mut document, &mut report, &mut HashMap::new())?;
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            elements = document.len(),
            failures = report.failures.len(),
            elapsed_ms = report.elapsed_ms,
            "bridge built"
        );
        Ok((document, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Frame, Mesh, Point2, Point3};
    use crate::solid::{MeshBackend, SolidRecipe};
    use crate::spec::load_bridge_str;
    use serde_json::json;

    const FIXTURE: &str = include_str!("../../tests/data/three_girder.json");

    fn spec_with(edit: impl FnOnce(&mut serde_json::Value)) -> BridgeSpec {
        let mut value: serde_json::Value = serde_json::from_str(FIXTURE).unwrap();
        edit(&mut value);
        load_bridge_str(&value.to_string(), &Default::default()).unwrap()
    }

    fn config(policy: FailurePolicy, parallel: bool) -> KernelConfig {
        let mut config = KernelConfig::default();
        config.build.failure_policy = policy;
        config.build.parallel = parallel;
        config
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let spec = spec_with(|_| {});
        let backend = MeshBackend::default();
        let (seq_doc, seq) =
            BridgeBuilder::new(&spec, &config(FailurePolicy::BestEffort, false), backend.clone())
                .build()
                .unwrap();
        let (par_doc, par) =
            BridgeBuilder::new(&spec, &config(FailurePolicy::BestEffort, true), backend)
                .build()
                .unwrap();
        assert!(seq.is_complete());
        assert_eq!(seq_doc.len(), 11);
        let names = |d: &Document| d.elements().iter().map(|e| e.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&seq_doc), names(&par_doc));
        assert_eq!(seq.built, par.built);
    }

    #[test]
    fn test_best_effort_records_failure() {
        let spec = spec_with(|v| {
            v["Yokogeta"][0]["Girder"] = json!(["G1", "G7"]);
        });
        let (document, report) =
            BridgeBuilder::new(&spec, &config(FailurePolicy::BestEffort, true), MeshBackend::default())
                .build()
                .unwrap();
        assert_eq!(document.len(), 10);
        let failure = report.failure("CB_G1_G7_C1").unwrap();
        assert_eq!(failure.kind, MemberKind::CrossBeam);
        assert!(failure.error.contains("G7"));
    }

    #[test]
    fn test_abort_on_first_fails_the_build() {
        let spec = spec_with(|v| {
            v["Shouban"][0]["Station"] = json!(["S1", "S9"]);
        });
        let err = BridgeBuilder::new(
            &spec,
            &config(FailurePolicy::AbortOnFirst, false),
            MeshBackend::default(),
        )
        .build()
        .unwrap_err();
        assert!(err.to_string().contains("Shouban `DK1` failed"));
    }

    fn plate(name: &str) -> (ElementRecipe, Mesh, f64) {
        let recipe = ElementRecipe::new(
            name,
            ElementClass::Plate,
            None,
            SolidRecipe::Extruded {
                profile: vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(100.0, 0.0),
                    Point2::new(100.0, 50.0),
                    Point2::new(0.0, 50.0),
                ],
                length: 10.0,
                frame: Frame::world(Point3::origin()),
            },
        );
        let solid = MeshBackend::default().realize(name, &recipe.recipe).unwrap();
        (recipe, solid, 50_000.0)
    }

    #[test]
    fn test_failed_member_attaches_nothing() {
        let spec = spec_with(|_| {});
        let builder = BridgeBuilder::new(
            &spec,
            &config(FailurePolicy::BestEffort, false),
            MeshBackend::default(),
        );
        let mut document = Document::new("Bridge");
        let mut report = BuildReport::default();
        let (_, taken, _) = plate("T1-B");
        document
            .attach_named_element(None, taken, "T1-B", ElementClass::Plate)
            .unwrap();

        let clash = Realized {
            elements: vec![plate("T1-A"), plate("T1-B")],
            axes: Vec::new(),
        };
        builder
            .commit(
                (MemberKind::SubPanel, "T1".into(), Ok(clash)),
                &mut document,
                &mut report,
                &mut HashMap::new(),
            )
            .unwrap();
        assert_eq!(document.len(), 1);
        assert!(!document.contains("T1-A"));
        assert!(report.built.is_empty());
        assert!(report.failure("T1").unwrap().error.contains("T1-B"));

        // the same name twice within one member
        let twice = Realized {
            elements: vec![plate("T2-A"), plate("T2-A")],
            axes: Vec::new(),
        };
        builder
            .commit(
                (MemberKind::SubPanel, "T2".into(), Ok(twice)),
                &mut document,
                &mut report,
                &mut HashMap::new(),
            )
            .unwrap();
        assert!(!document.contains("T2-A"));
        assert!(report.built.is_empty());
        assert!(report.failure("T2").is_some());
    }

    #[test]
    fn test_gusset_without_published_axis() {
        let spec = spec_with(|v| {
            v["Gusset"] = json!([{
                "Panel": "G1B1W", "Member": "CF9_Top", "Position": "TL",
                "EdgeOffset": "B40", "Thick": 10.0
            }]);
        });
        let (_, report) =
            BridgeBuilder::new(&spec, &config(FailurePolicy::BestEffort, false), MeshBackend::default())
                .build()
                .unwrap();
        let failure = report.failure("G1B1W-GussTL").unwrap();
        assert_eq!(failure.kind, MemberKind::Gusset);
        assert!(failure.error.contains("CF9_Top"));
    }
}
