//! End-to-end lifecycle and port behavior through a [`World`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use engine_component::{Component, FrameContext, ObjectId};
use engine_connect::{MessageIn, MessageOut, PortError, PropertyIn, PropertyOut};
use engine_math::{Transform, Vec3};
use engine_world::{DrawPass, World, WorldConfig, WorldError};

type Journal = Rc<RefCell<Vec<String>>>;

struct Recorder {
    tag: String,
    journal: Journal,
}

impl Recorder {
    fn new(tag: impl Into<String>, journal: &Journal) -> Self {
        Self {
            tag: tag.into(),
            journal: Rc::clone(journal),
        }
    }

    fn log(&self, hook: &str) {
        self.journal.borrow_mut().push(format!("{}:{hook}", self.tag));
    }
}

impl Component for Recorder {
    fn initialize(&mut self, _ctx: &mut FrameContext<'_>) {
        self.log("init");
    }

    fn update(&mut self, _ctx: &mut FrameContext<'_>) {
        self.log("update");
    }

    fn destroy(&mut self, _ctx: &mut FrameContext<'_>) {
        self.log("destroy");
    }
}

fn spawn(world: &mut World, tag: &str, journal: &Journal) -> ObjectId {
    let mut builder = world.create_object(tag);
    builder.add_component(|_| Recorder::new(format!("{tag}.0"), journal));
    builder.add_component(|_| Recorder::new(format!("{tag}.1"), journal));
    builder.build()
}

fn drain(journal: &Journal) -> Vec<String> {
    std::mem::take(&mut *journal.borrow_mut())
}

#[test]
fn test_created_objects_initialize_exactly_once_before_any_update() {
    let journal = Journal::default();
    let mut world = World::default();
    spawn(&mut world, "a", &journal);
    world.frame(0.016);
    drain(&journal);

    spawn(&mut world, "b", &journal);
    spawn(&mut world, "c", &journal);
    world.frame(0.016);
    assert_eq!(
        drain(&journal),
        vec!["b.0:init", "b.1:init", "c.0:init", "c.1:init", "a.0:update", "a.1:update"]
    );

    world.frame(0.016);
    let hooks = drain(&journal);
    assert_eq!(hooks.iter().filter(|h| h.ends_with(":init")).count(), 0);
    assert_eq!(hooks.len(), 6);
}

#[test]
fn test_destroyed_object_gets_one_destroy_and_is_gone_next_frame() {
    let journal = Journal::default();
    let mut world = World::default();
    let doomed = spawn(&mut world, "doomed", &journal);
    let kept = spawn(&mut world, "kept", &journal);
    world.frame(0.016);
    drain(&journal);

    world.destroy_object(doomed).unwrap();
    world.destroy_object(doomed).unwrap();
    world.frame(0.016);
    assert_eq!(
        drain(&journal),
        vec!["kept.0:update", "kept.1:update", "doomed.0:destroy", "doomed.1:destroy"]
    );
    assert!(world.object(doomed).is_none());
    assert!(world.object(kept).is_some());

    world.frame(0.016);
    assert!(drain(&journal).iter().all(|h| h.starts_with("kept")));
    assert!(matches!(
        world.destroy_object(doomed),
        Err(WorldError::Object(_))
    ));
}

#[test]
fn test_same_frame_create_and_destroy_never_updates() {
    let journal = Journal::default();
    let mut world = World::default();
    let id = spawn(&mut world, "blink", &journal);
    world.destroy_object(id).unwrap();
    world.frame(0.016);
    assert_eq!(
        drain(&journal),
        vec!["blink.0:init", "blink.1:init", "blink.0:destroy", "blink.1:destroy"]
    );
    assert!(world.objects().is_empty());
}

struct Source {
    value: PropertyOut<i32>,
}

impl Component for Source {}

struct Sink {
    value: PropertyIn<i32>,
}

impl Component for Sink {}

struct FloatSink {
    value: PropertyIn<f32>,
}

impl Component for FloatSink {}

#[test]
fn test_property_write_is_visible_immediately() {
    let mut world = World::default();
    let mut builder = world.create_object("source");
    let output = builder
        .add_component(|ports| Source {
            value: PropertyOut::new(ports, 0),
        })
        .value
        .id();
    let source = builder.build();
    let mut builder = world.create_object("sink");
    let input = builder
        .add_component(|ports| Sink {
            value: PropertyIn::new(ports),
        })
        .value
        .id();
    let sink = builder.build();

    let read = |world: &World| {
        world
            .object(sink)
            .and_then(|o| o.component::<Sink>())
            .map(|s| s.value.get())
    };
    assert_eq!(read(&world), Some(Err(PortError::Unconnected(input))));

    world.connect(output, input).unwrap();
    world
        .object(source)
        .and_then(|o| o.component::<Source>())
        .unwrap()
        .value
        .set(42);
    assert_eq!(read(&world), Some(Ok(42)));
}

#[test]
fn test_mismatched_property_link_is_rejected() {
    let mut world = World::default();
    let output = world
        .create_object("source")
        .add_component(|ports| Source {
            value: PropertyOut::new(ports, 1),
        })
        .value
        .id();
    let input = world
        .create_object("sink")
        .add_component(|ports| FloatSink {
            value: PropertyIn::new(ports),
        })
        .value
        .id();

    let err = world.connect(output, input).unwrap_err();
    assert!(matches!(
        err,
        WorldError::Port(PortError::TypeMismatch { .. })
    ));
    assert!(!world.connections().is_connected(output));
    assert!(!world.connections().is_connected(input));
    assert_eq!(world.connections().link_count(), 0);
}

/// Fires its collision port with the frame number every update.
struct Collider {
    hits: MessageOut<u64>,
}

impl Component for Collider {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.hits.fire(&ctx.frame());
    }
}

struct HitCounter {
    hits: MessageIn<u64>,
}

impl Component for HitCounter {}

#[test]
fn test_messages_are_delivered_synchronously_to_every_input() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut world = World::default();
    let output = world
        .create_object("collider")
        .add_component(|ports| Collider {
            hits: MessageOut::new(ports),
        })
        .hits
        .id();

    let mut inputs = Vec::new();
    for name in ["left", "right"] {
        let seen = Rc::clone(&seen);
        let input = world
            .create_object(name)
            .add_component(|ports| HitCounter {
                hits: MessageIn::new(ports, move |frame: &u64| {
                    seen.borrow_mut().push((name, *frame));
                }),
            })
            .hits
            .id();
        inputs.push(input);
    }

    world.frame(0.016);
    world.frame(0.016);
    assert!(seen.borrow().is_empty());

    for input in &inputs {
        world.connect(output, *input).unwrap();
    }
    world.frame(0.016);
    assert_eq!(*seen.borrow(), vec![("left", 3), ("right", 3)]);

    world.disconnect(output).unwrap();
    world.frame(0.016);
    assert_eq!(seen.borrow().len(), 2);
}

/// Follows another object's root transform.
struct Follower {
    target: PropertyIn<Transform>,
    last_seen: Option<Vec3>,
}

impl Component for Follower {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        if let Ok(position) = self.target.with(|t| t.position) {
            self.last_seen = Some(position);
            ctx.set_transform(Transform::from_position(position + Vec3::Y));
        }
    }
}

#[test]
fn test_root_transform_is_a_property_output() {
    let mut world = World::default();
    let leader = world.create_object("leader").with_position(Vec3::X).build();
    let leader_root = world.object(leader).unwrap().root_port();

    let mut builder = world.create_object("follower");
    let input = builder
        .add_component(|ports| Follower {
            target: PropertyIn::new(ports),
            last_seen: None,
        })
        .target
        .id();
    builder.connect(leader_root, input).unwrap();
    let follower = builder.build();

    world.frame(0.016);
    world.object_mut(leader).unwrap().translate(Vec3::Z);
    world.frame(0.016);

    let object = world.object(follower).unwrap();
    assert_eq!(
        object.component::<Follower>().unwrap().last_seen,
        Some(Vec3::new(1.0, 0.0, 1.0))
    );
    assert_eq!(object.position(), Ok(Vec3::new(1.0, 1.0, 1.0)));
}

/// Reads its own object's root and writes it back from inside the read.
struct Drifter {
    me: PropertyIn<Transform>,
    writes: Vec<bool>,
}

impl Component for Drifter {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let written = self
            .me
            .with(|t| ctx.set_transform(t.translated(Vec3::X)));
        self.writes.push(written.unwrap_or(false));
        if let Some(next) = self.me.get().ok().map(|t| t.translated(Vec3::X)) {
            self.writes.push(ctx.set_transform(next));
        }
    }
}

#[test]
fn test_writing_own_root_inside_a_read_is_skipped_not_fatal() {
    let mut world = World::default();
    let mut builder = world.create_object("drifter");
    let root = builder.root_port();
    let input = builder
        .add_component(|ports| Drifter {
            me: PropertyIn::new(ports),
            writes: Vec::new(),
        })
        .me
        .id();
    builder.connect(root, input).unwrap();
    let drifter = builder.build();

    world.frame(0.016);
    world.frame(0.016);
    world.frame(0.016);

    let object = world.object(drifter).unwrap();
    assert_eq!(
        object.component::<Drifter>().unwrap().writes,
        vec![false, true, false, true]
    );
    assert_eq!(object.position(), Ok(Vec3::new(2.0, 0.0, 0.0)));
}

/// Publishes a value and records what the directory looked like when its
/// destroy hook ran.
struct Producer {
    value: PropertyOut<i32>,
    seen_at_destroy: Rc<Cell<Option<(usize, bool)>>>,
}

impl Component for Producer {
    fn destroy(&mut self, ctx: &mut FrameContext<'_>) {
        let links = ctx.connections().link_count();
        let registered = ctx.connections().info(self.value.id()).is_some();
        self.seen_at_destroy.set(Some((links, registered)));
    }
}

#[test]
fn test_producer_ports_are_unlinked_before_its_destroy_hook() {
    let seen = Rc::new(Cell::new(None));
    let mut world = World::default();
    let mut builder = world.create_object("producer");
    let hook_seen = Rc::clone(&seen);
    let output = builder
        .add_component(|ports| Producer {
            value: PropertyOut::new(ports, 9),
            seen_at_destroy: hook_seen,
        })
        .value
        .id();
    let producer = builder.build();
    let mut builder = world.create_object("reader");
    let input = builder
        .add_component(|ports| Sink {
            value: PropertyIn::new(ports),
        })
        .value
        .id();
    let reader = builder.build();
    world.connect(output, input).unwrap();

    let read = |world: &World| {
        world
            .object(reader)
            .and_then(|o| o.component::<Sink>())
            .map(|s| s.value.get())
    };
    world.frame(0.016);
    assert_eq!(read(&world), Some(Ok(9)));

    world.destroy_object(producer).unwrap();
    world.frame(0.016);

    assert_eq!(seen.get(), Some((0, false)));
    assert_eq!(read(&world), Some(Err(PortError::Unconnected(input))));
    assert!(!world.connections().is_connected(input));
}

#[test]
fn test_mixed_create_and_destroy_frame_keeps_survivor_order() {
    let journal = Journal::default();
    let mut world = World::default();
    let old: Vec<ObjectId> = (0..5)
        .map(|i| spawn(&mut world, &format!("o{i}"), &journal))
        .collect();
    world.frame(0.016);

    let n1 = spawn(&mut world, "n1", &journal);
    world.destroy_object(old[1]).unwrap();
    let n2 = spawn(&mut world, "n2", &journal);
    world.destroy_object(old[3]).unwrap();
    world.destroy_object(n1).unwrap();
    drain(&journal);

    let report = world.frame(0.016);
    assert_eq!((report.initialized, report.destroyed, report.live), (2, 3, 4));
    let expected = vec![old[0], old[2], old[4], n2];
    assert_eq!(world.objects().ids().collect::<Vec<_>>(), expected);
    drain(&journal);

    world.frame(0.016);
    assert_eq!(world.objects().ids().collect::<Vec<_>>(), expected);
    for id in expected {
        assert!(world.object(id).is_some());
    }
    let updated: Vec<String> = drain(&journal)
        .into_iter()
        .filter(|h| h.ends_with(".0:update"))
        .collect();
    assert_eq!(
        updated,
        vec!["o0.0:update", "o2.0:update", "o4.0:update", "n2.0:update"]
    );
}

/// Draw collector: renderables register on initialize and leave on destroy.
#[derive(Default)]
struct DrawList {
    registered: Vec<ObjectId>,
    submitted: usize,
}

impl DrawPass for DrawList {
    fn call_draws(&mut self) {
        self.submitted += self.registered.len();
    }
}

struct Renderable;

impl Component for Renderable {
    fn initialize(&mut self, ctx: &mut FrameContext<'_>) {
        let id = ctx.object_id();
        if let Some(draws) = ctx.resource_mut::<DrawList>() {
            draws.registered.push(id);
        }
    }

    fn destroy(&mut self, ctx: &mut FrameContext<'_>) {
        let id = ctx.object_id();
        if let Some(draws) = ctx.resource_mut::<DrawList>() {
            draws.registered.retain(|&r| r != id);
        }
    }
}

#[test]
fn test_renderables_register_with_draw_collector() {
    let mut world = World::default().with_draw_pass(DrawList::default());
    let first = world.create_object("first").with_component(|_| Renderable).build();
    world.create_object("second").add_component(|_| Renderable);

    world.frame(0.016);
    assert_eq!(world.resource::<DrawList>().unwrap().registered.len(), 2);
    assert_eq!(world.resource::<DrawList>().unwrap().submitted, 2);

    world.destroy_object(first).unwrap();
    world.frame(0.016);
    let draws = world.resource::<DrawList>().unwrap();
    assert_eq!(draws.registered.len(), 1);
    assert_eq!(draws.submitted, 3);

    world.shutdown();
    assert!(world.resource::<DrawList>().unwrap().registered.is_empty());
}

/// Spawns a projectile each update and retires it three frames later.
struct Launcher {
    journal: Journal,
    in_flight: VecDeque<(u64, ObjectId)>,
}

impl Component for Launcher {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let frame = ctx.frame();
        while let Some(&(launched, id)) = self.in_flight.front() {
            if frame < launched + 3 {
                break;
            }
            ctx.destroy_object(id).unwrap();
            self.in_flight.pop_front();
        }
        let tag = format!("p{frame}");
        let journal = Rc::clone(&self.journal);
        let id = ctx
            .create_object(tag.clone())
            .with_component(|_| Recorder::new(tag, &journal))
            .build();
        self.in_flight.push_back((frame, id));
    }
}

#[test]
fn test_run_with_mid_frame_spawning() {
    let journal = Journal::default();
    let config = WorldConfig::from_json_str(r#"{ "max_frames": 4, "fixed_delta": 0.5 }"#).unwrap();
    let mut world = World::new(config);
    let launcher_journal = Rc::clone(&journal);
    world.create_object("launcher").add_component(|_| Launcher {
        journal: launcher_journal,
        in_flight: VecDeque::new(),
    });

    assert_eq!(world.run(), 4);
    assert_eq!(world.frame_rate(), 2.0);
    assert_eq!(
        drain(&journal),
        vec![
            // frame 2
            "p1:init",
            // frame 3
            "p2:init",
            "p1:update",
            // frame 4: p1 is marked before its turn to update
            "p3:init",
            "p2:update",
            "p1:destroy",
            // shutdown
            "p2:destroy",
            "p3:destroy",
            "p4:init",
            "p4:destroy",
        ]
    );
    assert_eq!(world.frame_count(), 4);
    assert!(world.objects().is_empty());
}
