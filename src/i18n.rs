//! User-facing strings. Every reply the backend writes itself, as opposed to
//! text coming back from the model, is rendered here in the session language.

use crate::config::SCHOOL_PHONE;
use crate::models::language::Language;

pub fn system_busy(lang: Language) -> String {
    match lang {
        Language::Ca => "Ho sento molt, el sistema està temporalment saturat per l'alta demanda. Espera uns segons i torna-ho a intentar.",
        Language::Es => "Lo siento mucho, el sistema está temporalmente saturado por la alta demanda. Espera unos segundos y vuelve a intentarlo.",
        Language::Ar => "عذراً، النظام مشغول مؤقتاً بسبب كثرة الطلبات. يرجى الانتظار بضع ثوانٍ والمحاولة مرة أخرى.",
    }
    .to_string()
}

pub fn processing_error(lang: Language) -> String {
    match lang {
        Language::Ca => "Ho sento, hi ha hagut un error processant la teva consulta. Torna-ho a intentar en uns segons.",
        Language::Es => "Lo siento, ha habido un error procesando tu consulta. Vuelve a intentarlo en unos segundos.",
        Language::Ar => "عذراً، حدث خطأ أثناء معالجة استفسارك. يرجى المحاولة مرة أخرى بعد بضع ثوانٍ.",
    }
    .to_string()
}

pub fn chat_unavailable(lang: Language) -> String {
    match lang {
        Language::Ca => "Ho sento, hi ha hagut un problema tècnic. Si us plau, recarrega la pàgina.",
        Language::Es => "Lo siento, ha habido un problema técnico. Por favor, recarga la página.",
        Language::Ar => "عذراً، حدثت مشكلة تقنية. يرجى إعادة تحميل الصفحة.",
    }
    .to_string()
}

pub fn complete_required_fields(lang: Language) -> String {
    match lang {
        Language::Ca => "Si us plau, completa tots els camps requerits.",
        Language::Es => "Por favor, completa todos los campos obligatorios.",
        Language::Ar => "يرجى ملء جميع الحقول المطلوبة.",
    }
    .to_string()
}

pub fn form_not_recognized(lang: Language) -> String {
    match lang {
        Language::Ca => "No s'ha pogut processar el formulari. Si us plau, torna-ho a intentar.",
        Language::Es => "No se ha podido procesar el formulario. Por favor, vuelve a intentarlo.",
        Language::Ar => "تعذرت معالجة النموذج. يرجى المحاولة مرة أخرى.",
    }
    .to_string()
}

pub fn absence_sent(lang: Language, recipient: &str) -> String {
    match lang {
        Language::Ca => format!(
            "Justificació enviada correctament!\n\nDestinatari: {}\n\nEn breu rebràs confirmació de recepció.",
            recipient
        ),
        Language::Es => format!(
            "¡Justificación enviada correctamente!\n\nDestinatario: {}\n\nEn breve recibirás la confirmación de recepción.",
            recipient
        ),
        Language::Ar => format!(
            "تم إرسال التبرير بنجاح!\n\nالمستلم: {}\n\nستصلك رسالة تأكيد قريباً.",
            recipient
        ),
    }
}

pub fn absence_failed(lang: Language, recipient: &str) -> String {
    match lang {
        Language::Ca => format!(
            "Error en enviar la justificació.\n\nAlternatives:\n• Trucar al {}\n• Enviar un correu manualment a {}",
            SCHOOL_PHONE, recipient
        ),
        Language::Es => format!(
            "Error al enviar la justificación.\n\nAlternativas:\n• Llamar al {}\n• Enviar un correo manualmente a {}",
            SCHOOL_PHONE, recipient
        ),
        Language::Ar => format!(
            "حدث خطأ أثناء إرسال التبرير.\n\nالبدائل:\n• الاتصال بالرقم {}\n• إرسال بريد إلكتروني يدوياً إلى {}",
            SCHOOL_PHONE, recipient
        ),
    }
}

pub fn teacher_message_sent(lang: Language, recipient: &str) -> String {
    match lang {
        Language::Ca => format!(
            "Missatge enviat correctament!\n\nDestinatari: {}\n\nEl professor/a rebrà el teu missatge i et respondrà al teu correu.",
            recipient
        ),
        Language::Es => format!(
            "¡Mensaje enviado correctamente!\n\nDestinatario: {}\n\nEl profesor/a recibirá tu mensaje y te responderá a tu correo.",
            recipient
        ),
        Language::Ar => format!(
            "تم إرسال الرسالة بنجاح!\n\nالمستلم: {}\n\nسيتلقى الأستاذ رسالتك وسيرد على بريدك الإلكتروني.",
            recipient
        ),
    }
}

pub fn teacher_message_failed(lang: Language, recipient: &str) -> String {
    match lang {
        Language::Ca => format!(
            "Error en enviar el missatge.\n\nAlternatives:\n• Trucar al {}\n• Enviar un correu directament a {}",
            SCHOOL_PHONE, recipient
        ),
        Language::Es => format!(
            "Error al enviar el mensaje.\n\nAlternativas:\n• Llamar al {}\n• Enviar un correo directamente a {}",
            SCHOOL_PHONE, recipient
        ),
        Language::Ar => format!(
            "حدث خطأ أثناء إرسال الرسالة.\n\nالبدائل:\n• الاتصال بالرقم {}\n• إرسال بريد إلكتروني مباشرة إلى {}",
            SCHOOL_PHONE, recipient
        ),
    }
}

pub fn login_required(lang: Language) -> String {
    match lang {
        Language::Ca => "Cal iniciar sessió.",
        Language::Es => "Es necesario iniciar sesión.",
        Language::Ar => "يجب تسجيل الدخول.",
    }
    .to_string()
}

pub fn login_subtitle(lang: Language) -> String {
    match lang {
        Language::Ca => "Assistent virtual de l'Institut Alexandre de Riquer",
        Language::Es => "Asistente virtual del Institut Alexandre de Riquer",
        Language::Ar => "المساعد الافتراضي لمعهد ألكسندر دي ريكير",
    }
    .to_string()
}

pub fn login_button(lang: Language) -> String {
    match lang {
        Language::Ca => "Inicia sessió amb Google",
        Language::Es => "Inicia sesión con Google",
        Language::Ar => "تسجيل الدخول باستخدام Google",
    }
    .to_string()
}

pub fn login_error(lang: Language, detail: &str) -> String {
    match lang {
        Language::Ca => format!("Error d'autenticació: {}", detail),
        Language::Es => format!("Error de autenticación: {}", detail),
        Language::Ar => format!("خطأ في المصادقة: {}", detail),
    }
}

pub fn login_unavailable(lang: Language) -> String {
    match lang {
        Language::Ca => "L'inici de sessió amb Google no està configurat. Contacteu amb l'administrador.",
        Language::Es => "El inicio de sesión con Google no está configurado. Contactad con el administrador.",
        Language::Ar => "تسجيل الدخول باستخدام Google غير مُعدّ. يرجى التواصل مع المسؤول.",
    }
    .to_string()
}

pub fn chat_request_failed(lang: Language) -> String {
    match lang {
        Language::Ca => "Error processant la consulta",
        Language::Es => "Error procesando la consulta",
        Language::Ar => "خطأ في معالجة الاستفسار",
    }
    .to_string()
}

/// Wraps a user question with the instructions sent alongside it to the model.
pub fn question_prompt(lang: Language, user_name: &str, question: &str) -> String {
    let name = lang.native_name();
    format!(
        "IMPORTANT: answer ONLY in {name}. Check the institute files before answering.\n\n\
         User: {user_name}\n\
         Question: {question}\n\n\
         Remember:\n\
         - Use the institute files as your source.\n\
         - If the information is not available, say so clearly.\n\
         - Always answer in {name}.\n\
         - Be kind and professional."
    )
}
